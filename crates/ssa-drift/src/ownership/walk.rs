//! Walk a claim tree against a concrete object.
//!
//! Claim trees use the managed-fields encoding: `f:<name>` for map fields,
//! `k:{...}` for keyed list elements, `v:<json>` for set elements and `.`
//! for the node itself. Every claimed node is translated into the same
//! [`FieldPath`] addressing the extractor would emit for that object, and a
//! node claimed as a whole stands for all of its extractor leaves.

use std::collections::HashMap;

use serde_json::{Map, Value};
use ssa_drift_fieldpath::{
    find_index, find_value_index, parse_key_token, parse_value_token, FieldPath, MatchMode,
    MergeKeyTuple, PathSet, Step, FIELD_PREFIX, KEY_PREFIX, LEAF_MARKER, VALUE_PREFIX,
};

use crate::error::Result;
use crate::extract::{extract_array, extract_element, extract_field};
use crate::policy::{ArrayKind, ArrayPolicy};

/// True if a claim node claims itself rather than its children.
fn is_leaf(claim: &Value) -> bool {
    match claim {
        Value::Object(map) => map.is_empty() || (map.len() == 1 && map.contains_key(LEAF_MARKER)),
        _ => true,
    }
}

pub(crate) struct ClaimWalker<'p> {
    policy: &'p ArrayPolicy,
    mode: MatchMode,
    keys: HashMap<String, MergeKeyTuple>,
    element_identity: bool,
}

impl<'p> ClaimWalker<'p> {
    pub(crate) fn new(policy: &'p ArrayPolicy, mode: MatchMode) -> Self {
        Self {
            policy,
            mode,
            keys: HashMap::new(),
            element_identity: false,
        }
    }

    /// Inside a keyed list that failed validation, address a claimed element
    /// by its own identity when it has one instead of by the whole list.
    pub(crate) fn with_element_identity(mut self) -> Self {
        self.element_identity = true;
        self
    }

    /// Collect the paths `claims` attributes within `tree`.
    ///
    /// # Errors
    ///
    /// `MalformedKey` for a `k:` or `v:` token that does not parse.
    pub(crate) fn walk(&mut self, claims: &Map<String, Value>, tree: &Value) -> Result<PathSet> {
        let mut out = PathSet::new();
        if let Value::Object(map) = tree {
            self.walk_map(claims, map, &FieldPath::root(), &mut out)?;
        }
        Ok(out)
    }

    fn walk_map(
        &mut self,
        claims: &Map<String, Value>,
        map: &Map<String, Value>,
        base: &FieldPath,
        out: &mut PathSet,
    ) -> Result<()> {
        for (token, claim) in claims {
            if token == LEAF_MARKER {
                continue;
            }
            let Some(name) = token.strip_prefix(FIELD_PREFIX) else {
                tracing::debug!(
                    token = %token,
                    path = %base,
                    "dropping non-field claim under a map"
                );
                continue;
            };
            let Some(child) = map.get(name) else {
                continue;
            };
            let path = base.field(name);
            self.claim_value(name, claim, child, path, out)?;
        }
        Ok(())
    }

    fn claim_value(
        &mut self,
        field: &str,
        claim: &Value,
        value: &Value,
        path: FieldPath,
        out: &mut PathSet,
    ) -> Result<()> {
        match (claim, value) {
            (Value::Object(sub), Value::Object(inner)) if !is_leaf(claim) && !inner.is_empty() => {
                self.walk_map(sub, inner, &path, out)
            }
            (Value::Object(sub), Value::Array(arr)) if !is_leaf(claim) => {
                self.walk_array(field, sub, arr, &path, out)
            }
            // Claimed as a whole, or sub-claims that do not fit the value.
            _ => {
                extract_field(field, value, &path, self.policy, out);
                Ok(())
            }
        }
    }

    fn walk_array(
        &mut self,
        field: &str,
        claims: &Map<String, Value>,
        arr: &[Value],
        base: &FieldPath,
        out: &mut PathSet,
    ) -> Result<()> {
        let addressing = self.policy.classify(field, arr);
        for (token, claim) in claims {
            if token == LEAF_MARKER {
                continue;
            }
            let idx = if token.starts_with(KEY_PREFIX) {
                let tuple = self.key(token)?;
                find_index(arr, &tuple, self.mode)
            } else if token.starts_with(VALUE_PREFIX) {
                let value = parse_value_token(token)?;
                find_value_index(arr, &value)
            } else {
                extract_array(field, arr, base, self.policy, out);
                continue;
            };
            let Some(idx) = idx else {
                tracing::debug!(
                    token = %token,
                    path = %base,
                    "dropping claim that matches no element"
                );
                continue;
            };
            let step = addressing
                .element_step(arr, idx)
                .or_else(|| self.identity_step(field, &arr[idx]));
            let Some(step) = step else {
                out.insert(base.clone());
                continue;
            };
            let path = base.child(step);
            match (claim, &arr[idx]) {
                (Value::Object(sub), Value::Object(element))
                    if !is_leaf(claim) && !element.is_empty() =>
                {
                    self.walk_map(sub, element, &path, out)?;
                }
                _ => extract_element(&arr[idx], &path, self.policy, out),
            }
        }
        Ok(())
    }

    fn identity_step(&self, field: &str, element: &Value) -> Option<Step> {
        if !self.element_identity {
            return None;
        }
        match self.policy.kind_of(field) {
            ArrayKind::Keyed(fields) => {
                MergeKeyTuple::from_element(element, fields).map(Step::Select)
            }
            ArrayKind::Positional | ArrayKind::Opaque => None,
        }
    }

    fn key(&mut self, token: &str) -> Result<MergeKeyTuple> {
        if let Some(tuple) = self.keys.get(token) {
            return Ok(tuple.clone());
        }
        let tuple = parse_key_token(token)?;
        self.keys.insert(token.to_string(), tuple.clone());
        Ok(tuple)
    }
}
