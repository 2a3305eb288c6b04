pub mod admin;
pub mod auth;
pub mod batch;
pub mod category;
pub mod credit;
pub mod favorite;
pub mod health;
pub mod order;
pub mod rating;
pub mod resource;
pub mod tag;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in PATCH-style bodies.
pub(crate) fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        parent_id: Option<Option<Uuid>>,
    }

    #[test]
    fn should_tell_null_from_missing() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.parent_id, None);
        let null: Patch = serde_json::from_str(r#"{"parentId":null}"#).unwrap();
        assert_eq!(null.parent_id, Some(None));
        let id = Uuid::new_v4();
        let set: Patch = serde_json::from_str(&format!(r#"{{"parentId":"{id}"}}"#)).unwrap();
        assert_eq!(set.parent_id, Some(Some(id)));
    }
}
