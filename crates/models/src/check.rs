use serde::{Deserialize, Serialize};

/// Status label given to a check when it is first registered.
pub const STATUS_CREATED: &str = "Created";

/// A registered endpoint health record.
///
/// `id` is derived from `endpoint` and is the dedup key of the collection.
/// `code`, `checked` and `duration` are reserved for a prober and are carried
/// through storage untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub id: String,
    pub status: String,
    pub code: i32,
    pub endpoint: String,
    /// Unix seconds of the last probe; zero until probed.
    pub checked: i64,
    pub duration: String,
}

impl Check {
    /// A freshly registered check: `Created` status, reserved fields zeroed.
    pub fn created(id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: STATUS_CREATED.to_string(),
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_zeroes_reserved_fields() {
        let c = Check::created("abc", "http://example.com/");
        assert_eq!(c.status, STATUS_CREATED);
        assert_eq!(c.code, 0);
        assert_eq!(c.checked, 0);
        assert!(c.duration.is_empty());
    }

    #[test]
    fn json_uses_plain_field_names() {
        let c = Check::created("abc", "http://example.com/");
        let v = serde_json::to_value(&c).unwrap();
        for key in ["id", "status", "code", "endpoint", "checked", "duration"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert_eq!(v["endpoint"], "http://example.com/");
    }
}
