use super::registry::Registry;
use super::render::render_index;
use crate::utils::first_line;
use poise::serenity_prelude as serenity;
use std::collections::HashSet;
use std::time::Duration;

/// Discord caps a select menu at this many options
pub const MAX_OPTIONS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Active,
    Resolved,
    Expired,
}

/// Commands of one category, formatted for the help embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryListing {
    pub category: String,
    pub lines: Vec<String>,
}

impl CategoryListing {
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Someone other than the invoker touched the menu
    Denied,
    Resolved(CategoryListing),
    /// The category vanished (unloaded) or was never offered
    Missing(String),
    /// The picker already resolved or expired
    Inactive,
}

/// Single-use category menu bound to one help invocation
#[derive(Debug, Clone)]
pub struct CategoryPicker {
    custom_id: String,
    categories: Vec<String>,
    owner: serenity::UserId,
    message: Option<serenity::MessageId>,
    timeout: Option<Duration>,
    state: PickerState,
}

impl CategoryPicker {
    pub fn new(
        invocation_id: u64,
        registry: &Registry,
        invoker: serenity::UserId,
        owners: &HashSet<serenity::UserId>,
        timeout: Option<Duration>,
    ) -> Self {
        let mut categories = render_index(registry, invoker, owners);
        categories.truncate(MAX_OPTIONS);

        Self {
            custom_id: format!("help-picker:{invocation_id}"),
            categories,
            owner: invoker,
            message: None,
            timeout,
            state: PickerState::Active,
        }
    }

    pub fn custom_id(&self) -> &str {
        &self.custom_id
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn owner(&self) -> serenity::UserId {
        self.owner
    }

    pub fn message(&self) -> Option<serenity::MessageId> {
        self.message
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn bind(&mut self, message: serenity::MessageId) {
        self.message = Some(message);
    }

    /// `(label, description)` for every menu option
    pub fn options(&self) -> Vec<(String, String)> {
        self.categories
            .iter()
            .map(|name| (name.clone(), format!("Show commands for {name}")))
            .collect()
    }

    pub fn on_select(
        &mut self,
        user: serenity::UserId,
        chosen: &str,
        registry: &Registry,
        prefix: &str,
    ) -> Selection {
        if self.state != PickerState::Active {
            return Selection::Inactive;
        }
        if user != self.owner {
            return Selection::Denied;
        }

        let category = self
            .categories
            .iter()
            .any(|name| name == chosen)
            .then(|| registry.category(chosen))
            .flatten();
        let Some(category) = category else {
            return Selection::Missing(chosen.to_string());
        };

        let lines = category
            .commands
            .iter()
            .map(|command| {
                format!(
                    "{}{} - {}",
                    prefix,
                    command.name,
                    first_line(&command.description)
                )
            })
            .collect();

        self.state = PickerState::Resolved;
        Selection::Resolved(CategoryListing {
            category: category.name.clone(),
            lines,
        })
    }

    pub fn expire(&mut self) {
        if self.state == PickerState::Active {
            self.state = PickerState::Expired;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::help::registry::tests::sample_registry;

    fn owners() -> HashSet<serenity::UserId> {
        [serenity::UserId::new(1)].into_iter().collect()
    }

    fn picker_for(invoker: u64) -> CategoryPicker {
        CategoryPicker::new(
            77,
            &sample_registry(),
            serenity::UserId::new(invoker),
            &owners(),
            None,
        )
    }

    #[test]
    fn test_options_follow_visible_categories() {
        let picker = picker_for(2);
        assert_eq!(
            picker.options(),
            vec![("General".to_string(), "Show commands for General".to_string())]
        );
        assert_eq!(picker.custom_id(), "help-picker:77");
        assert_eq!(picker.timeout(), None);
        assert_eq!(picker_for(1).categories(), ["General", "owner"]);
    }

    #[test]
    fn test_other_user_is_denied_and_picker_stays_active() {
        let registry = sample_registry();
        let mut picker = picker_for(2);
        picker.bind(serenity::MessageId::new(500));

        let result = picker.on_select(serenity::UserId::new(3), "General", &registry, ";");
        assert_eq!(result, Selection::Denied);
        assert_eq!(picker.state(), PickerState::Active);
        assert_eq!(picker.message(), Some(serenity::MessageId::new(500)));
    }

    #[test]
    fn test_owner_selection_resolves_with_prefixed_lines() {
        let registry = sample_registry();
        let mut picker = picker_for(2);

        let result = picker.on_select(serenity::UserId::new(2), "General", &registry, "!");
        let Selection::Resolved(listing) = result else {
            panic!("expected a resolved selection, got {result:?}");
        };
        assert_eq!(listing.category, "General");
        assert_eq!(
            listing.lines,
            vec![
                "!ping - Check if the bot is alive.".to_string(),
                "!translate - Translate text".to_string(),
            ]
        );
        assert_eq!(listing.body().lines().count(), 2);
        assert_eq!(picker.state(), PickerState::Resolved);
    }

    #[test]
    fn test_picker_is_single_shot() {
        let registry = sample_registry();
        let mut picker = picker_for(2);
        picker.on_select(serenity::UserId::new(2), "General", &registry, ";");
        assert_eq!(
            picker.on_select(serenity::UserId::new(2), "General", &registry, ";"),
            Selection::Inactive
        );
    }

    #[test]
    fn test_unloaded_category_is_missing() {
        let mut picker = picker_for(2);
        let unloaded = ["general".to_string()].into_iter().collect();
        let registry = sample_registry().without_modules(&unloaded);

        assert_eq!(
            picker.on_select(serenity::UserId::new(2), "General", &registry, ";"),
            Selection::Missing("General".to_string())
        );
        assert_eq!(picker.state(), PickerState::Active);
    }

    #[test]
    fn test_unoffered_category_is_missing() {
        let registry = sample_registry();
        let mut picker = picker_for(2);
        assert_eq!(
            picker.on_select(serenity::UserId::new(2), "owner", &registry, ";"),
            Selection::Missing("owner".to_string())
        );
    }

    #[test]
    fn test_expire_only_from_active() {
        let registry = sample_registry();
        let mut picker = picker_for(2);
        picker.expire();
        assert_eq!(picker.state(), PickerState::Expired);

        let mut resolved = picker_for(2);
        resolved.on_select(serenity::UserId::new(2), "General", &registry, ";");
        resolved.expire();
        assert_eq!(resolved.state(), PickerState::Resolved);
    }
}
