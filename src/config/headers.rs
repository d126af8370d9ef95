//! Header buckets and flattening.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::merge::merge_buckets;
use super::Method;

/// A single bucket of header name/value entries.
///
/// Values are JSON so response buckets can carry `set-cookie` arrays;
/// request-side entries are strings.
pub type HeaderBucket = Map<String, Value>;

/// The enumerated header buckets of a request config.
///
/// `flatten` resolves them for one request: the `common` bucket, then the
/// bucket of the request's method, then the per-request `direct` bucket,
/// later entries overwriting earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeaderConfig {
    /// Headers applied to every request.
    pub common: HeaderBucket,
    /// Headers applied to requests of a specific method.
    pub per_method: HashMap<Method, HeaderBucket>,
    /// Headers applied to this request only; take precedence over both
    /// other buckets.
    pub direct: HeaderBucket,
}

impl HeaderConfig {
    /// Wraps an already-flattened bucket; `common` and the method buckets
    /// stay empty so a further `flatten` is a no-op.
    pub fn from_flat(direct: HeaderBucket) -> Self {
        Self {
            direct,
            ..Self::default()
        }
    }

    /// Mutable access to the bucket of `method`, creating it when absent.
    pub fn for_method_mut(&mut self, method: Method) -> &mut HeaderBucket {
        self.per_method.entry(method).or_default()
    }

    /// Resolves the effective headers for a request of `method`.
    pub fn flatten(&self, method: Method) -> HeaderBucket {
        let mut flat = self.common.clone();
        if let Some(bucket) = self.per_method.get(&method) {
            flat.extend(bucket.clone());
        }
        flat.extend(self.direct.clone());
        flat
    }

    /// Deep-merges `target` over `self` bucket-wise, producing a new
    /// value that shares no storage with either operand.
    pub fn merged(&self, target: &HeaderConfig) -> HeaderConfig {
        let mut per_method = HashMap::new();
        let empty = HeaderBucket::new();
        for method in Method::ALL {
            let source = self.per_method.get(&method);
            let over = target.per_method.get(&method);
            if source.is_none() && over.is_none() {
                continue;
            }
            per_method.insert(
                method,
                merge_buckets(source.unwrap_or(&empty), over.unwrap_or(&empty)),
            );
        }

        HeaderConfig {
            common: merge_buckets(&self.common, &target.common),
            per_method,
            direct: merge_buckets(&self.direct, &target.direct),
        }
    }
}
