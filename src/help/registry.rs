use poise::Command;
use std::collections::HashSet;

/// Who may see a category in help listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Never listed, but its commands can still be looked up by name
    Hidden,
    /// Listed and described only for bot owners
    OwnerOnly,
}

/// Help metadata poise doesn't track itself. Attached to a command's
/// `custom_data` when its cog is registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandMeta {
    pub usage: Option<&'static str>,
    pub example: Option<&'static str>,
    /// Display values for optional parameters, by parameter name
    pub defaults: &'static [(&'static str, &'static str)],
}

impl CommandMeta {
    pub const fn usage(usage: &'static str) -> Self {
        Self {
            usage: Some(usage),
            example: None,
            defaults: &[],
        }
    }

    pub const fn example(mut self, example: &'static str) -> Self {
        self.example = Some(example);
        self
    }

    pub const fn defaults(mut self, defaults: &'static [(&'static str, &'static str)]) -> Self {
        self.defaults = defaults;
        self
    }

    fn default_for(&self, parameter: &str) -> Option<&'static str> {
        self.defaults
            .iter()
            .find(|(name, _)| *name == parameter)
            .map(|(_, value)| *value)
    }
}

/// Walks `command` and its subcommands, attaching entries from `table`
/// (keyed by space-separated qualified name) and setting the category.
pub fn attach_meta<U, E>(
    command: &mut Command<U, E>,
    parent: Option<&str>,
    category: &str,
    table: &[(&str, CommandMeta)],
) {
    let qualified = match parent {
        Some(parent) => format!("{} {}", parent, command.name),
        None => command.name.clone(),
    };

    command.category = Some(category.to_string());
    if let Some((_, meta)) = table.iter().find(|(name, _)| *name == qualified) {
        command.custom_data = Box::new(*meta);
    }

    for sub in &mut command.subcommands {
        attach_meta(sub, Some(&qualified), category, table);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub required: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Group,
    /// Invocable both with a prefix and as a slash command
    Hybrid,
    TextOnly,
}

impl CommandKind {
    pub fn label(self) -> &'static str {
        match self {
            CommandKind::Group => "Command Group",
            CommandKind::Hybrid => "Chat+Slash Command",
            CommandKind::TextOnly => "Chat Only Command",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub usage: Option<String>,
    pub example: Option<String>,
    pub aliases: Vec<String>,
    pub category: String,
    pub kind: CommandKind,
    pub parameters: Vec<ParameterDescriptor>,
    pub subcommands: Vec<CommandDescriptor>,
}

impl CommandDescriptor {
    pub fn from_command<U, E>(command: &Command<U, E>, category: &str) -> Self {
        let meta = command
            .custom_data
            .downcast_ref::<CommandMeta>()
            .copied()
            .unwrap_or_default();

        let kind = if !command.subcommands.is_empty() {
            CommandKind::Group
        } else if command.slash_action.is_some() {
            CommandKind::Hybrid
        } else {
            CommandKind::TextOnly
        };

        let parameters = command
            .parameters
            .iter()
            .map(|param| ParameterDescriptor {
                name: param.name.clone(),
                required: param.required,
                default: (!param.required).then(|| {
                    meta.default_for(&param.name)
                        .unwrap_or("None")
                        .to_string()
                }),
            })
            .collect();

        Self {
            name: command.name.clone(),
            description: command.description.clone().unwrap_or_default(),
            usage: meta.usage.map(str::to_string),
            example: meta.example.map(str::to_string),
            aliases: command.aliases.clone(),
            category: category.to_string(),
            kind,
            parameters,
            subcommands: command
                .subcommands
                .iter()
                .map(|sub| Self::from_command(sub, category))
                .collect(),
        }
    }

    fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a CommandDescriptor>) {
        out.push(self);
        for sub in &self.subcommands {
            sub.walk(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    /// Key used to load and unload the category at runtime
    pub module: String,
    pub access: Access,
    pub commands: Vec<CommandDescriptor>,
}

impl Category {
    pub fn new<U, E>(name: &str, module: &str, access: Access, commands: &[Command<U, E>]) -> Self {
        Self {
            name: name.to_string(),
            module: module.to_string(),
            access,
            commands: commands
                .iter()
                .map(|command| CommandDescriptor::from_command(command, name))
                .collect(),
        }
    }
}

/// Read-only snapshot of every registered category and command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    categories: Vec<Category>,
}

impl Registry {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn walk_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn category_by_module(&self, module: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.module.eq_ignore_ascii_case(module))
    }

    /// Resolves a command by name or alias. Space-separated names walk into
    /// subcommands, so `dev sync` finds `sync` inside the `dev` group.
    pub fn get_command(&self, query: &str) -> Option<(&Category, &CommandDescriptor)> {
        let mut parts = query.split_whitespace();
        let first = parts.next()?;

        let (category, mut command) = self.categories.iter().find_map(|category| {
            category
                .commands
                .iter()
                .find(|command| command.answers_to(first))
                .map(|command| (category, command))
        })?;

        for part in parts {
            command = command.subcommands.iter().find(|sub| sub.answers_to(part))?;
        }

        Some((category, command))
    }

    /// Every command, groups before their subcommands
    pub fn walk_commands(&self) -> Vec<&CommandDescriptor> {
        let mut out = Vec::new();
        for command in self.categories.iter().flat_map(|category| &category.commands) {
            command.walk(&mut out);
        }
        out
    }

    /// Number of commands, subcommands included
    pub fn command_count(&self) -> usize {
        self.walk_commands().len()
    }

    /// Copy of the registry without the given (unloaded) modules
    pub fn without_modules(&self, unloaded: &HashSet<String>) -> Self {
        Self {
            categories: self
                .categories
                .iter()
                .filter(|category| !unloaded.contains(&category.module))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn command(name: &str, description: &str) -> CommandDescriptor {
        CommandDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            usage: None,
            example: None,
            aliases: Vec::new(),
            category: String::new(),
            kind: CommandKind::Hybrid,
            parameters: Vec::new(),
            subcommands: Vec::new(),
        }
    }

    pub fn category(name: &str, access: Access, commands: Vec<CommandDescriptor>) -> Category {
        Category {
            name: name.to_string(),
            module: name.trim_start_matches('-').to_lowercase(),
            access,
            commands: commands
                .into_iter()
                .map(|mut c| {
                    c.category = name.to_string();
                    c
                })
                .collect(),
        }
    }

    /// General / -Hidden / owner, with a `dev` group in owner
    pub fn sample_registry() -> Registry {
        let mut ping = command("ping", "Check if the bot is alive.");
        ping.aliases = vec!["pong".to_string()];

        let mut translate = command("translate", "Translate text\nsecond line");
        translate.parameters = vec![
            ParameterDescriptor {
                name: "text".to_string(),
                required: true,
                default: None,
            },
            ParameterDescriptor {
                name: "language".to_string(),
                required: false,
                default: Some("en".to_string()),
            },
        ];

        let mut dev = command("dev", "Commands for devs");
        dev.kind = CommandKind::Group;
        dev.subcommands = vec![
            command("sync", "Sync the slash commands."),
            command("load", "Load a cog"),
        ];

        Registry::new(vec![
            category("General", Access::Public, vec![ping, translate]),
            category("-Hidden", Access::Hidden, vec![command("secret", "Hidden command")]),
            category("owner", Access::OwnerOnly, vec![dev]),
        ])
    }

    #[test]
    fn test_get_command_by_name_and_alias() {
        let registry = sample_registry();
        assert_eq!(registry.get_command("ping").unwrap().1.name, "ping");
        assert_eq!(registry.get_command("PONG").unwrap().1.name, "ping");
        assert!(registry.get_command("nope").is_none());
        assert!(registry.get_command("").is_none());
    }

    #[test]
    fn test_get_qualified_subcommand() {
        let registry = sample_registry();
        let (category, sync) = registry.get_command("dev  sync").unwrap();
        assert_eq!(sync.name, "sync");
        assert_eq!(category.name, "owner");
        assert!(registry.get_command("dev nope").is_none());
    }

    #[test]
    fn test_command_count_includes_subcommands() {
        assert_eq!(sample_registry().command_count(), 6);
    }

    #[test]
    fn test_walk_commands_is_depth_first() {
        let registry = sample_registry();
        let names: Vec<_> = registry
            .walk_commands()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["ping", "translate", "secret", "dev", "sync", "load"]);
    }

    #[test]
    fn test_without_modules() {
        let registry = sample_registry();
        let unloaded: HashSet<String> = ["general".to_string()].into_iter().collect();
        let view = registry.without_modules(&unloaded);
        assert!(view.category("General").is_none());
        assert!(view.get_command("ping").is_none());
        assert!(view.category("owner").is_some());
    }

    #[test]
    fn test_category_by_module_ignores_case() {
        let registry = sample_registry();
        assert_eq!(registry.category_by_module("OWNER").unwrap().name, "owner");
        assert!(registry.category_by_module("economy").is_none());
    }

    #[test]
    fn test_command_kind_labels() {
        assert_eq!(CommandKind::Group.label(), "Command Group");
        assert_eq!(CommandKind::Hybrid.label(), "Chat+Slash Command");
        assert_eq!(CommandKind::TextOnly.label(), "Chat Only Command");
    }
}
