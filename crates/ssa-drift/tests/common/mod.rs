#![allow(dead_code)]

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("ssa_drift=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

pub const SELF: &str = "deployer";

pub fn desired_deployment() -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": "web",
            "namespace": "prod",
            "labels": {"app": "web"},
            "annotations": {"team": "payments"}
        },
        "spec": {
            "replicas": 3,
            "template": {
                "spec": {
                    "containers": [{
                        "name": "app",
                        "image": "nginx:1.25",
                        "args": ["-g", "daemon off;"],
                        "ports": [{"containerPort": 80}]
                    }]
                }
            }
        }
    })
}

/// The desired deployment as the server reports it after an apply by
/// [`SELF`], with the replica count taken over by an autoscaler.
pub fn live_deployment() -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": "web",
            "namespace": "prod",
            "uid": "6f1c",
            "resourceVersion": "1042",
            "generation": 4,
            "labels": {"app": "web"},
            "annotations": {"team": "payments", "deployment.kubernetes.io/revision": "4"},
            "managedFields": [
                {
                    "manager": SELF,
                    "operation": "Apply",
                    "apiVersion": "apps/v1",
                    "time": "2024-05-01T10:00:00Z",
                    "fieldsType": "FieldsV1",
                    "fieldsV1": {
                        "f:metadata": {
                            "f:labels": {"f:app": {}},
                            "f:annotations": {"f:team": {}}
                        },
                        "f:spec": {
                            "f:template": {"f:spec": {"f:containers": {
                                "k:{\"name\":\"app\"}": {
                                    ".": {},
                                    "f:name": {},
                                    "f:image": {},
                                    "f:args": {},
                                    "f:ports": {
                                        "k:{\"containerPort\":80,\"protocol\":\"TCP\"}": {
                                            ".": {},
                                            "f:containerPort": {}
                                        }
                                    }
                                }
                            }}}
                        }
                    }
                },
                {
                    "manager": "hpa-controller",
                    "operation": "Update",
                    "apiVersion": "autoscaling/v2",
                    "time": "2024-05-01T10:05:00Z",
                    "fieldsType": "FieldsV1",
                    "fieldsV1": {"f:spec": {"f:replicas": {}}}
                },
                {
                    "manager": "kube-controller-manager",
                    "operation": "Update",
                    "apiVersion": "apps/v1",
                    "fieldsType": "FieldsV1",
                    "subresource": "status",
                    "fieldsV1": {"f:status": {"f:replicas": {}, "f:readyReplicas": {}}}
                }
            ]
        },
        "spec": {
            "replicas": 5,
            "revisionHistoryLimit": 10,
            "template": {
                "spec": {
                    "containers": [{
                        "name": "app",
                        "image": "nginx:1.25",
                        "args": ["-g", "daemon off;"],
                        "imagePullPolicy": "IfNotPresent",
                        "ports": [{"containerPort": 80, "protocol": "TCP"}]
                    }]
                }
            }
        },
        "status": {"replicas": 5, "readyReplicas": 5}
    })
}
