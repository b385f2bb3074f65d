//! The fixed persona roster.
//!
//! Ten specialist roles collaborate on every problem; `User` exists so that
//! messages submitted by the human share the same sender type. The LLM
//! spells role names inconsistently (`businessanalyst`, `Business analyst`,
//! `BUSINESS ANALYST`), so lookup is case- and whitespace-insensitive.

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

/// A participant in a session conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum PersonaRole {
    /// Leads the team, delegates work and compiles the final solution.
    Coordinator,
    /// Clarifies requirements and business constraints.
    BusinessAnalyst,
    /// Designs system structure and technology choices.
    TechnicalArchitect,
    /// Implements the hard parts.
    SeniorDeveloper,
    /// Implements well-scoped, simpler pieces.
    JuniorDeveloper,
    /// Designs test strategy and hunts for edge cases.
    SeniorQa,
    /// Executes straightforward verification work.
    JuniorQa,
    /// Shapes user flows and interaction design.
    UxEngineer,
    /// Shapes visual and layout design.
    UiEngineer,
    /// Writes user-facing and internal documentation.
    DocumentWriter,
    /// The human who submitted the problem. Never a delegate target.
    User,
}

impl PersonaRole {
    /// Canonical display name, as shown in transcripts and matched in
    /// `[DELEGATE:...]` tags.
    pub fn display_name(&self) -> &'static str {
        match self {
            PersonaRole::Coordinator => "Coordinator",
            PersonaRole::BusinessAnalyst => "Business Analyst",
            PersonaRole::TechnicalArchitect => "Technical Architect",
            PersonaRole::SeniorDeveloper => "Senior Developer",
            PersonaRole::JuniorDeveloper => "Junior Developer",
            PersonaRole::SeniorQa => "Senior QA",
            PersonaRole::JuniorQa => "Junior QA",
            PersonaRole::UxEngineer => "UX Engineer",
            PersonaRole::UiEngineer => "UI Engineer",
            PersonaRole::DocumentWriter => "Document Writer",
            PersonaRole::User => "User",
        }
    }

    /// The ten AI roles, in roster order. Excludes `User`.
    pub fn roster() -> Vec<PersonaRole> {
        use strum::IntoEnumIterator;
        PersonaRole::iter()
            .filter(|role| *role != PersonaRole::User)
            .collect()
    }

    /// Resolves a free-form role name to a roster member.
    ///
    /// Matching folds case and strips all whitespace, so "businessanalyst",
    /// "Business analyst" and "BUSINESS  ANALYST" all resolve to
    /// `BusinessAnalyst`. `User` is not a valid delegate target and never
    /// matches.
    pub fn match_name(name: &str) -> Option<PersonaRole> {
        let wanted = fold(name);
        if wanted.is_empty() {
            return None;
        }
        PersonaRole::roster()
            .into_iter()
            .find(|role| fold(role.display_name()) == wanted)
    }

    /// True for states where the role may be handed work via delegation.
    pub fn is_delegatable(&self) -> bool {
        *self != PersonaRole::User
    }
}

impl std::fmt::Display for PersonaRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

fn fold(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}
