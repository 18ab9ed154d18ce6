//! Playback session: collecting answers for a template and producing the story.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::config::Settings;
use crate::core::substitution::{AnswerSet, SubstitutionError};
use crate::schema::prompt::PromptIndex;
use crate::schema::template::{Story, StoryTemplate};

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("the story has already been played")]
    AlreadyPlayed,
    #[error("no prompt with index {0}")]
    UnknownPrompt(PromptIndex),
    #[error("substitution error: {0}")]
    Substitution(#[from] SubstitutionError),
}

/// Holds one answer per prompt of a template, in the order prompts are
/// shown, until the story is played. After `play` the answers are frozen.
#[derive(Debug, Clone)]
pub struct PlayerSession {
    template: StoryTemplate,
    order: Vec<PromptIndex>,
    answers: AnswerSet,
    story: Option<Story>,
}

impl PlayerSession {
    /// Prompts in ascending index order.
    pub fn new(template: StoryTemplate) -> Self {
        let order: Vec<PromptIndex> = template.inputs().keys().copied().collect();
        let answers = order.iter().map(|index| (*index, String::new())).collect();
        PlayerSession {
            template,
            order,
            answers,
            story: None,
        }
    }

    /// Prompts in an order drawn from `rng`.
    pub fn shuffled<R: Rng + ?Sized>(template: StoryTemplate, rng: &mut R) -> Self {
        let mut session = Self::new(template);
        session.order.shuffle(rng);
        session
    }

    /// Order prompts according to `settings.shuffle_prompts` and `settings.seed`.
    pub fn from_settings(template: StoryTemplate, settings: &Settings) -> Self {
        if !settings.shuffle_prompts {
            return Self::new(template);
        }
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::shuffled(template, &mut rng)
    }

    pub fn template(&self) -> &StoryTemplate {
        &self.template
    }

    /// `(index, prompt text)` pairs in display order.
    pub fn prompts(&self) -> impl Iterator<Item = (PromptIndex, &str)> + '_ {
        self.order.iter().map(move |index| {
            let prompt = self
                .template
                .inputs()
                .get(index)
                .map(String::as_str)
                .unwrap_or_default();
            (*index, prompt)
        })
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn answer(&mut self, index: PromptIndex, text: impl Into<String>) -> Result<(), PlayerError> {
        if self.story.is_some() {
            return Err(PlayerError::AlreadyPlayed);
        }
        let slot = self
            .answers
            .get_mut(&index)
            .ok_or(PlayerError::UnknownPrompt(index))?;
        *slot = text.into();
        Ok(())
    }

    /// True while any answer is blank.
    pub fn is_incomplete(&self) -> bool {
        self.answers.values().any(|answer| answer.trim().is_empty())
    }

    pub fn is_played(&self) -> bool {
        self.story.is_some()
    }

    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    /// Fill in the template. On `InputEmpty` the session stays open so the
    /// player can supply the missing answer and try again.
    pub fn play(&mut self) -> Result<&Story, PlayerError> {
        if self.story.is_some() {
            return Err(PlayerError::AlreadyPlayed);
        }
        let story = self.template.substitute(&self.answers)?;
        debug!(filename = self.template.filename(), "story played");
        Ok(self.story.insert(story))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn template(count: u32) -> StoryTemplate {
        let inputs: BTreeMap<PromptIndex, String> = (1..=count)
            .map(|i| (PromptIndex(i), format!("prompt {i}")))
            .collect();
        let body: String = (1..=count).map(|i| format!("{{{i}}} ")).collect();
        StoryTemplate::new("t", "Title {1}", inputs, body).unwrap()
    }

    #[test]
    fn unshuffled_order_is_ascending() {
        let session = PlayerSession::new(template(4));
        let order: Vec<u32> = session.prompts().map(|(i, _)| i.0).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
        assert_eq!(session.prompts().next().unwrap().1, "prompt 1");
    }

    #[test]
    fn shuffle_is_deterministic_per_seed() {
        let settings = Settings {
            seed: Some(99),
            ..Settings::default()
        };
        let a: Vec<_> = PlayerSession::from_settings(template(12), &settings)
            .prompts()
            .map(|(i, _)| i)
            .collect();
        let b: Vec<_> = PlayerSession::from_settings(template(12), &settings)
            .prompts()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort();
        assert_eq!(sorted, (1..=12).map(PromptIndex).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_disabled_in_settings() {
        let settings = Settings {
            shuffle_prompts: false,
            ..Settings::default()
        };
        let order: Vec<u32> = PlayerSession::from_settings(template(5), &settings)
            .prompts()
            .map(|(i, _)| i.0)
            .collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn play_fills_story_and_freezes() {
        let mut session = PlayerSession::new(template(2));
        assert!(session.is_incomplete());
        session.answer(PromptIndex(1), " Ann ").unwrap();
        session.answer(PromptIndex(2), "runs").unwrap();
        assert!(!session.is_incomplete());

        let story = session.play().unwrap().clone();
        assert_eq!(story.title, "Title Ann");
        assert_eq!(story.body, "Ann runs ");
        assert!(session.is_played());
        assert!(matches!(
            session.answer(PromptIndex(1), "Bo"),
            Err(PlayerError::AlreadyPlayed)
        ));
        assert!(matches!(session.play(), Err(PlayerError::AlreadyPlayed)));
    }

    #[test]
    fn blank_answer_allows_retry() {
        let mut session = PlayerSession::new(template(3));
        session.answer(PromptIndex(1), "a").unwrap();
        session.answer(PromptIndex(3), "c").unwrap();
        match session.play() {
            Err(PlayerError::Substitution(SubstitutionError::InputEmpty(index))) => {
                assert_eq!(index, PromptIndex(2));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!session.is_played());
        session.answer(PromptIndex(2), "b").unwrap();
        assert_eq!(session.play().unwrap().body, "a b c ");
    }

    #[test]
    fn unknown_prompt_rejected() {
        let mut session = PlayerSession::new(template(1));
        assert!(matches!(
            session.answer(PromptIndex(8), "x"),
            Err(PlayerError::UnknownPrompt(PromptIndex(8)))
        ));
    }
}
