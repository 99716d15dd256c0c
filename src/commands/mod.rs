// Commands module - one file per command (or command group), grouped into cogs below
pub mod botinfo;
pub mod dev;
pub mod eightball;
pub mod help;
pub mod messaging;
pub mod ping;
pub mod prefix;
pub mod settings;
pub mod stealemoji;
pub mod translate;
pub mod uptime;

use crate::help::{attach_meta, Access, Category, CommandMeta};
use crate::{Data, Error};

/// A named group of commands, loaded and unloaded as a unit
pub struct Cog {
    pub name: &'static str,
    pub module: &'static str,
    pub access: Access,
    pub commands: Vec<poise::Command<Data, Error>>,
}

impl Cog {
    fn new(
        name: &'static str,
        module: &'static str,
        access: Access,
        mut commands: Vec<poise::Command<Data, Error>>,
        meta: &[(&str, CommandMeta)],
    ) -> Self {
        for command in &mut commands {
            attach_meta(command, None, name, meta);
        }
        Self {
            name,
            module,
            access,
            commands,
        }
    }

    pub fn category(&self) -> Category {
        Category::new(self.name, self.module, self.access, &self.commands)
    }
}

pub const GENERAL: &str = "⬜ General";
pub const OWNER: &str = "owner";
pub const SERVER: &str = "⚙️ Server";

const GENERAL_META: &[(&str, CommandMeta)] = &[
    ("help", CommandMeta::usage("help [optional: command]").example("help translate")),
    ("uptime", CommandMeta::usage("uptime")),
    ("botinfo", CommandMeta::usage("botinfo")),
    ("ping", CommandMeta::usage("ping")),
    (
        "translate",
        CommandMeta::usage("translate <text> <language>")
            .example("translate \"How are you\" es")
            .defaults(&[("language", "en")]),
    ),
    ("8ball", CommandMeta::usage("8ball <question>").example("8ball Will it rain today?")),
];

const OWNER_META: &[(&str, CommandMeta)] = &[
    ("dev", CommandMeta::usage("dev <subcommand> [args]")),
    ("dev sync", CommandMeta::usage("dev sync guild/global")),
    ("dev unsync", CommandMeta::usage("dev unsync guild/global")),
    ("dev load", CommandMeta::usage("dev load <cog>")),
    ("dev unload", CommandMeta::usage("dev unload <cog>")),
    ("dev reload", CommandMeta::usage("dev reload <cog>")),
    ("dev shutdown", CommandMeta::usage("dev shutdown")),
    ("dev eval", CommandMeta::usage("eval <code>").example("dev eval guilds * 2")),
    (
        "dev blacklist",
        CommandMeta::usage("dev blacklist <user> [reason: optional]")
            .defaults(&[("reason", "No reason provided")]),
    ),
    ("dev unblacklist", CommandMeta::usage("dev unblacklist <user>")),
    ("say", CommandMeta::usage("say <message>")),
    (
        "embed",
        CommandMeta::usage("embed <title> <description> [footer]")
            .defaults(&[("description", ""), ("title", ""), ("footer", "")]),
    ),
    ("reply", CommandMeta::usage("reply <channel_id> <message_id> <reply>")),
    ("dm", CommandMeta::usage("dev dm <user> <message>")),
];

const SERVER_META: &[(&str, CommandMeta)] = &[
    ("prefix", CommandMeta::usage("prefix <symbol>").defaults(&[("prefix", "none")])),
    ("stealemoji", CommandMeta::usage("stealemoji <emoji> <name>")),
    ("settings", CommandMeta::usage("settings <subcommand> [args]")),
    ("settings show", CommandMeta::usage("settings show")),
    ("settings daily-cash", CommandMeta::usage("settings daily-cash <amount>")),
    ("settings log-channel", CommandMeta::usage("settings log-channel <channel>")),
];

/// Every cog the bot ships with, in display order
pub fn cogs() -> Vec<Cog> {
    vec![
        Cog::new(
            GENERAL,
            "general",
            Access::Public,
            vec![
                help::help(),
                uptime::uptime(),
                botinfo::botinfo(),
                ping::ping(),
                translate::translate(),
                eightball::eight_ball(),
            ],
            GENERAL_META,
        ),
        Cog::new(
            OWNER,
            "owner",
            Access::OwnerOnly,
            vec![
                dev::dev(),
                messaging::say(),
                messaging::embed(),
                messaging::reply(),
                messaging::dm(),
            ],
            OWNER_META,
        ),
        Cog::new(
            SERVER,
            "server",
            Access::Public,
            vec![
                prefix::prefix(),
                stealemoji::stealemoji(),
                settings::settings(),
            ],
            SERVER_META,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::help::registry::{CommandDescriptor, CommandKind};
    use crate::help::Registry;

    fn registry() -> Registry {
        Registry::new(cogs().iter().map(Cog::category).collect())
    }

    #[test]
    fn test_cog_order_and_access() {
        let registry = registry();
        let names: Vec<_> = registry.walk_categories().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![GENERAL, OWNER, SERVER]);
        assert_eq!(registry.category(OWNER).unwrap().access, Access::OwnerOnly);
    }

    #[test]
    fn test_every_command_has_usage() {
        fn check(command: &CommandDescriptor) {
            assert!(command.usage.is_some(), "{} has no usage", command.name);
            command.subcommands.iter().for_each(check);
        }

        for category in registry().walk_categories() {
            category.commands.iter().for_each(check);
        }
    }

    #[test]
    fn test_dev_group_descriptor() {
        let registry = registry();
        let (category, dev) = registry.get_command("dev").unwrap();
        assert_eq!(category.name, OWNER);
        assert_eq!(dev.kind, CommandKind::Group);
        let subs: Vec<_> = dev.subcommands.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            subs,
            vec![
                "sync",
                "unsync",
                "load",
                "unload",
                "reload",
                "shutdown",
                "eval",
                "blacklist",
                "unblacklist"
            ]
        );
        assert_eq!(dev.subcommands[0].category, OWNER);
    }

    #[test]
    fn test_help_aliases_resolve() {
        let registry = registry();
        for alias in ["h", "commands", "cmds"] {
            assert_eq!(registry.get_command(alias).unwrap().1.name, "help");
        }
        assert_eq!(registry.get_command("setting show").unwrap().1.name, "show");
    }

    #[test]
    fn test_translate_parameters() {
        let registry = registry();
        let (_, translate) = registry.get_command("translate").unwrap();
        assert_eq!(translate.kind, CommandKind::Hybrid);
        assert_eq!(translate.parameters.len(), 2);
        assert!(translate.parameters[0].required);
        assert_eq!(translate.parameters[1].default.as_deref(), Some("en"));
    }

    #[test]
    fn test_text_only_commands() {
        let registry = registry();
        for name in ["uptime", "say", "embed", "reply", "dm", "prefix"] {
            let (_, command) = registry.get_command(name).unwrap();
            assert_eq!(command.kind, CommandKind::TextOnly, "{name}");
        }
    }

    #[test]
    fn test_ping_has_no_parameters() {
        let registry = registry();
        let (_, ping) = registry.get_command("ping").unwrap();
        assert!(ping.parameters.is_empty());
        assert_eq!(ping.usage.as_deref(), Some("ping"));
    }

    #[test]
    fn test_stealemoji_parameters_are_required() {
        let registry = registry();
        let (category, stealemoji) = registry.get_command("stealemoji").unwrap();
        assert_eq!(category.name, SERVER);
        let params: Vec<_> = stealemoji
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.required, p.default.as_deref()))
            .collect();
        assert_eq!(params, vec![("emoji", true, None), ("name", true, None)]);
    }
}
