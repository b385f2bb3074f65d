//! Default persona presets.
//!
//! Provides the system-defined configurations for the ten roster roles.
//! Seeding is idempotent: the presets are written only when the persona
//! repository is empty, so operator edits survive restarts.

use super::model::PersonaConfiguration;
use super::role::PersonaRole;

/// Default model identifier used by every preset.
const DEFAULT_MODEL: &str = "gpt-4o";

/// Completion cap shared by the presets.
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// The tag protocol every persona must follow, appended to each system prompt.
const PROTOCOL: &str = "\
You are part of a team solving the user's problem. Respond with plain text, \
and use these directives on their own lines when appropriate:\n\
[DELEGATE:<Persona Name>] <context for them> - hand the task to a teammate\n\
[CLARIFY] <question> - ask the user a question (only when truly blocked on them)\n\
[SOLUTION] <text> - present your result or the final compiled solution\n\
[STUCK] <reason> - admit you cannot make progress\n\
[DECLINE] <reason> - decline work outside your competence\n\
[STORE:<identifier>] <content> - save a note for yourself for later turns\n\
[REMEMBER:<identifier>] - recall a note you stored earlier\n\
[REASONING] <private thoughts> [/REASONING] - reasoning hidden from the transcript\n\
Team roster: Coordinator, Business Analyst, Technical Architect, Senior Developer, \
Junior Developer, Senior QA, Junior QA, UX Engineer, UI Engineer, Document Writer.";

/// Returns the official preset configurations for the ten roster roles.
pub fn default_configurations() -> Vec<PersonaConfiguration> {
    let personas: [(PersonaRole, f32, &str); 10] = [
        (
            PersonaRole::Coordinator,
            0.3,
            "You are the Coordinator, the team lead. You receive the user's problem, \
             break it down, delegate pieces to the right specialists, and compile their \
             results into one final solution. Only you may deliver the final [SOLUTION]. \
             Delegate early rather than doing specialist work yourself.",
        ),
        (
            PersonaRole::BusinessAnalyst,
            0.4,
            "You are the Business Analyst. You turn vague problem statements into \
             concrete requirements, constraints and acceptance criteria. When the \
             requirements are gathered, hand them back or delegate onward.",
        ),
        (
            PersonaRole::TechnicalArchitect,
            0.4,
            "You are the Technical Architect. You design system structure, choose \
             technologies and define interfaces. Produce designs that a developer can \
             implement without guessing.",
        ),
        (
            PersonaRole::SeniorDeveloper,
            0.3,
            "You are the Senior Developer. You implement the difficult parts of the \
             solution with production quality, and you review anything delicate.",
        ),
        (
            PersonaRole::JuniorDeveloper,
            0.5,
            "You are the Junior Developer. You implement well-scoped, clearly described \
             pieces. If a task is beyond you, say so with [DECLINE] rather than guessing.",
        ),
        (
            PersonaRole::SeniorQa,
            0.3,
            "You are the Senior QA engineer. You design the test strategy, probe edge \
             cases and judge whether the proposed solution actually solves the problem.",
        ),
        (
            PersonaRole::JuniorQa,
            0.5,
            "You are the Junior QA engineer. You execute straightforward verification \
             steps and report findings plainly.",
        ),
        (
            PersonaRole::UxEngineer,
            0.6,
            "You are the UX Engineer. You shape user flows, interaction design and \
             information architecture so the solution is pleasant to use.",
        ),
        (
            PersonaRole::UiEngineer,
            0.6,
            "You are the UI Engineer. You shape visual design, layout and styling \
             details of anything user-facing.",
        ),
        (
            PersonaRole::DocumentWriter,
            0.5,
            "You are the Document Writer. You produce clear documentation for whatever \
             the team builds: usage guides, summaries and explanations.",
        ),
    ];

    personas
        .into_iter()
        .enumerate()
        .map(|(index, (role, temperature, brief))| PersonaConfiguration {
            role,
            display_name: role.display_name().to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: format!("{brief}\n\n{PROTOCOL}"),
            temperature,
            max_tokens: DEFAULT_MAX_TOKENS,
            enabled: true,
            sort_order: index as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_roster_roles_present_and_enabled() {
        let presets = default_configurations();
        assert_eq!(presets.len(), 10);
        for role in PersonaRole::roster() {
            let preset = presets
                .iter()
                .find(|p| p.role == role)
                .unwrap_or_else(|| panic!("missing preset for {role}"));
            assert!(preset.enabled);
            assert!(preset.validate().is_ok());
        }
    }

    #[test]
    fn test_sort_order_is_roster_order() {
        let presets = default_configurations();
        assert_eq!(presets[0].role, PersonaRole::Coordinator);
        for (index, preset) in presets.iter().enumerate() {
            assert_eq!(preset.sort_order, index as u32);
        }
    }
}
