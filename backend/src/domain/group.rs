//! Group aggregate and related value types.

use serde::{Deserialize, Serialize};

use super::ids::GroupId;

/// A group in the directory.
///
/// Groups form a forest via `parent_id`; `None` marks a root. Acyclicity is
/// guaranteed by the group store, not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group identifier.
    pub id: GroupId,
    /// Parent group, `None` for roots.
    pub parent_id: Option<GroupId>,
    /// Display name.
    pub name: String,
}

impl Group {
    /// Construct a group record.
    pub fn new(id: GroupId, parent_id: Option<GroupId>, name: impl Into<String>) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
        }
    }
}

/// Reference to a group-or-absence in filter and selection contexts.
///
/// Replaces the legacy convention of threading a magic `-1` group id through
/// every call site: the "users without any group" case is its own variant,
/// and only the inbound boundary knows the sentinel encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupRef {
    /// A real group.
    Group(GroupId),
    /// The synthetic "without any group" selection.
    WithoutGroup,
}

/// Sentinel used on the wire for [`GroupRef::WithoutGroup`].
pub const WITHOUT_GROUP_SENTINEL: i64 = -1;

impl GroupRef {
    /// Decode a raw request value.
    ///
    /// Positive values name a real group, `-1` selects "without group",
    /// and anything else (zero included) counts as unset.
    pub const fn from_raw(value: i64) -> Option<Self> {
        match GroupId::try_new(value) {
            Ok(id) => Some(Self::Group(id)),
            Err(_) => {
                if value == WITHOUT_GROUP_SENTINEL {
                    Some(Self::WithoutGroup)
                } else {
                    None
                }
            }
        }
    }

    /// Encode for the wire, mapping [`Self::WithoutGroup`] back to the
    /// sentinel.
    pub const fn to_raw(self) -> i64 {
        match self {
            Self::Group(id) => id.get(),
            Self::WithoutGroup => WITHOUT_GROUP_SENTINEL,
        }
    }
}

/// One entry of a group selection widget.
///
/// Selection widgets are rendered elsewhere; this is the data they consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOption {
    /// Selected value, either a real group or the without-group entry.
    pub id: GroupRef,
    /// Display name.
    pub name: String,
    /// Parent group for indentation purposes.
    pub parent_id: Option<GroupId>,
    /// Depth below the roots, zero-based.
    pub depth: u32,
    /// Number of members; for the without-group entry, the number of users
    /// with no membership at all.
    pub member_count: u64,
}

impl Serialize for GroupRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.to_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(5, Some(GroupRef::Group(GroupId::try_new(5).expect("id"))))]
    #[case(-1, Some(GroupRef::WithoutGroup))]
    #[case(0, None)]
    #[case(-2, None)]
    fn group_ref_decodes_raw_values(#[case] raw: i64, #[case] expected: Option<GroupRef>) {
        assert_eq!(GroupRef::from_raw(raw), expected);
    }

    #[rstest]
    fn group_ref_round_trips_through_sentinel_encoding() {
        for raw in [1_i64, 99, WITHOUT_GROUP_SENTINEL] {
            let reference = GroupRef::from_raw(raw).expect("decodes");
            assert_eq!(reference.to_raw(), raw);
        }
    }

    #[rstest]
    fn group_option_serializes_without_group_as_sentinel() {
        let option = GroupOption {
            id: GroupRef::WithoutGroup,
            name: "Without group".to_owned(),
            parent_id: None,
            depth: 0,
            member_count: 3,
        };
        let json = serde_json::to_value(&option).expect("serialize");
        assert_eq!(json["id"], serde_json::json!(-1));
    }
}
