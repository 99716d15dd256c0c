use super::registry::{Access, Category, CommandKind, ParameterDescriptor, Registry};
use crate::error::HelpError;
use crate::utils::code_block;
use poise::serenity_prelude as serenity;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Detail view of a single command, independent of how it ends up on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandView {
    pub title: String,
    pub description: String,
    pub fields: Vec<Field>,
}

impl CommandView {
    #[cfg(test)]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    fn push(&mut self, name: &str, value: String, inline: bool) {
        self.fields.push(Field {
            name: name.to_string(),
            value,
            inline,
        });
    }
}

fn can_view(
    category: &Category,
    invoker: serenity::UserId,
    owners: &HashSet<serenity::UserId>,
) -> bool {
    category.access != Access::OwnerOnly || owners.contains(&invoker)
}

pub fn render_command(
    registry: &Registry,
    name: &str,
    invoker: serenity::UserId,
    owners: &HashSet<serenity::UserId>,
) -> Result<CommandView, HelpError> {
    let (category, command) = registry.get_command(name).ok_or(HelpError::NotFound)?;
    if !can_view(category, invoker, owners) {
        return Err(HelpError::NotFound);
    }

    let mut view = CommandView {
        title: format!("Command: {}", command.name),
        description: command.description.clone(),
        fields: Vec::new(),
    };

    let usage = command.usage.as_deref().unwrap_or("Not Set");
    let example = command.example.as_deref().unwrap_or("Not Set");
    view.push(
        "Usage",
        code_block(&format!("Syntax: {usage}\nExample: {example}")),
        false,
    );

    let aliases = if command.aliases.is_empty() {
        "None".to_string()
    } else {
        command.aliases.join(", ")
    };
    view.push("Aliases", code_block(&aliases), true);
    view.push("Category", code_block(&command.category), true);
    view.push("Type", code_block(command.kind.label()), true);
    view.push("Parameters", code_block(&format_parameters(&command.parameters)), false);

    if command.kind == CommandKind::Group {
        let subcommands = command
            .subcommands
            .iter()
            .map(|sub| sub.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        view.push("Subcommands", code_block(&subcommands), false);
    }

    Ok(view)
}

/// One line per parameter, or `None` when there are none
pub fn format_parameters(parameters: &[ParameterDescriptor]) -> String {
    if parameters.is_empty() {
        return "None".to_string();
    }

    parameters
        .iter()
        .map(|param| match (&param.default, param.required) {
            (_, true) => format!("{}: <Required>", param.name),
            (Some(default), false) => format!("{}: [Optional, default: '{}']", param.name, default),
            (None, false) => format!("{}: [Optional, default: 'None']", param.name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Names of the categories `invoker` may browse, in registration order
pub fn render_index(
    registry: &Registry,
    invoker: serenity::UserId,
    owners: &HashSet<serenity::UserId>,
) -> Vec<String> {
    registry
        .walk_categories()
        .filter(|category| category.access != Access::Hidden)
        .filter(|category| can_view(category, invoker, owners))
        .map(|category| category.name.clone())
        .collect()
}
