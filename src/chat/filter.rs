//! Filtering of the loaded chat directory.
//!
//! Pure functions over the cached snapshot; nothing here talks to a remote.

use serde::Deserialize;

use crate::user;

use super::model::ChatDto;

/// Search inputs. An empty field places no constraint and all present
/// constraints must hold.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct Filter {
    search: String,
    label: String,
    member: String,
}

impl Filter {
    pub fn new(
        search: impl Into<String>,
        label: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        Self {
            search: search.into(),
            label: label.into(),
            member: member.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn matches(&self, chat: &ChatDto) -> bool {
        let name_matches = self.search.is_empty()
            || chat
                .chat_name()
                .to_lowercase()
                .contains(&self.search.to_lowercase());
        let label_matches = self.label.is_empty() || chat.labels().iter().any(|l| *l == self.label);
        let member_matches =
            self.member.is_empty() || chat.members().iter().any(|m| m.to_string() == self.member);

        name_matches && label_matches && member_matches
    }

    pub fn apply(&self, chats: &[ChatDto]) -> Vec<ChatDto> {
        chats.iter().filter(|c| self.matches(c)).cloned().collect()
    }
}

/// Distinct labels and members across the loaded chats, in first-seen order.
#[derive(Default, Debug, PartialEq)]
pub struct Facets {
    labels: Vec<String>,
    members: Vec<user::Id>,
}

impl Facets {
    pub fn derive(chats: &[ChatDto]) -> Self {
        let mut facets = Self::default();

        for chat in chats {
            for label in chat.labels() {
                if !label.is_empty() && !facets.labels.contains(label) {
                    facets.labels.push(label.clone());
                }
            }
            for member in chat.members() {
                if !facets.members.contains(member) {
                    facets.members.push(member.clone());
                }
            }
        }

        facets
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn members(&self) -> &[user::Id] {
        &self.members
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use super::*;
    use crate::chat;

    fn uid(n: u128) -> user::Id {
        user::Id::from(Uuid::from_u128(n))
    }

    fn dto(n: u128, name: &str, members: &[u128], labels: &[&str]) -> ChatDto {
        ChatDto::new(
            chat::Id::from(Uuid::from_u128(n)),
            name,
            members.len() > 2,
            members.iter().map(|m| uid(*m)).collect(),
            labels.iter().map(|l| l.to_string()).collect(),
        )
    }

    fn directory() -> Vec<ChatDto> {
        vec![
            dto(1, "Team", &[1, 2], &["vip"]),
            dto(2, "Family", &[1, 3], &["home", "vip"]),
            dto(3, "Gym buddies", &[2, 3, 4], &[]),
        ]
    }

    fn names(chats: &[ChatDto]) -> Vec<&str> {
        chats.iter().map(|c| c.chat_name()).collect()
    }

    #[test]
    fn should_keep_everything_without_constraints() {
        let chats = directory();

        assert_eq!(Filter::default().apply(&chats), chats);
    }

    #[test]
    fn should_search_name_case_insensitively() {
        let chats = vec![dto(1, "Team", &[1, 2], &["vip"])];

        assert_eq!(names(&Filter::new("team", "", "").apply(&chats)), vec!["Team"]);
        assert_eq!(names(&Filter::new("TEA", "", "").apply(&chats)), vec!["Team"]);
        assert!(Filter::new("xyz", "", "").apply(&chats).is_empty());
    }

    #[test]
    fn should_filter_by_exact_label() {
        let chats = directory();

        assert_eq!(
            names(&Filter::new("", "vip", "").apply(&chats)),
            vec!["Team", "Family"]
        );
        assert!(Filter::new("", "vi", "").apply(&chats).is_empty());
    }

    #[test]
    fn should_filter_by_exact_member() {
        let chats = directory();
        let member = uid(3).to_string();

        assert_eq!(
            names(&Filter::new("", "", member).apply(&chats)),
            vec!["Family", "Gym buddies"]
        );
    }

    #[test]
    fn should_intersect_constraints() {
        let chats = directory();
        let member = uid(3).to_string();

        assert_eq!(
            names(&Filter::new("", "vip", member.clone()).apply(&chats)),
            vec!["Family"]
        );
        assert!(Filter::new("gym", "vip", member).apply(&chats).is_empty());
    }

    #[test]
    fn should_derive_facets_in_first_seen_order() {
        let facets = Facets::derive(&directory());

        assert_eq!(facets.labels(), &["vip", "home"]);
        assert_eq!(facets.members(), &[uid(1), uid(2), uid(3), uid(4)]);
    }

    #[test]
    fn should_skip_blank_labels_in_facets() {
        let facets = Facets::derive(&[dto(1, "Team", &[1], &["", "vip"])]);

        assert_eq!(facets.labels(), &["vip"]);
    }
}
