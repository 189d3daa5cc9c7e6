use chrono::Utc;
use tracing::{debug, info, warn};

use super::ResearchError;
use super::parse::{ParsedSynthesis, parse_synthesis};
use super::prompt::{self, FINAL_SYSTEM_PROMPT, FOLLOW_UP_SYSTEM_PROMPT, SYNTHESIS_SYSTEM_PROMPT};
use super::sources::SourceSet;
use super::types::{Mode, ResearchQuery, ResearchResult, Round, SynthesisRequest};
use crate::cerebras::SynthesisProvider;
use crate::config::ResearchSettings;
use crate::exa::SearchProvider;

const FOLLOW_UP_MAX_TOKENS: u32 = 64;
const USE_AUTOPROMPT: bool = true;

struct FirstRound {
    sources: SourceSet,
    parsed: ParsedSynthesis,
}

/// Composes a search provider and a synthesis provider into research flows.
/// Each call is a linear pipeline; the first failure aborts it, except for
/// follow-up query generation, which falls back to the original query.
pub struct Orchestrator<S, L> {
    search: S,
    synthesis: L,
    settings: ResearchSettings,
}

impl<S: SearchProvider, L: SynthesisProvider> Orchestrator<S, L> {
    pub fn new(search: S, synthesis: L, settings: ResearchSettings) -> Self {
        Self {
            search,
            synthesis,
            settings,
        }
    }

    #[cfg(test)]
    pub(crate) fn providers(&self) -> (&S, &L) {
        (&self.search, &self.synthesis)
    }

    pub async fn basic_research(&self, query: &str) -> Result<ResearchResult, ResearchError> {
        info!(%query, "basic research");

        let Some(first) = self.first_round(query).await? else {
            return Ok(ResearchResult::no_sources(query, Mode::Basic));
        };

        let sources = first.sources.into_vec();
        Ok(ResearchResult {
            original_query: query.to_string(),
            mode: Mode::Basic,
            follow_up_query: None,
            source_count: sources.len(),
            summary: first.parsed.summary,
            insights: first.parsed.insights,
            depth_gained: None,
            sources,
            timestamp: Utc::now(),
        })
    }

    pub async fn deep_research(&self, query: &str) -> Result<ResearchResult, ResearchError> {
        info!(%query, "deep research");

        let Some(first) = self.first_round(query).await? else {
            return Ok(ResearchResult::no_sources(query, Mode::Deep));
        };
        let FirstRound {
            mut sources,
            parsed: first_parsed,
        } = first;

        let follow_up = self.follow_up_query(query, &first_parsed).await;
        let follow_up_round = ResearchQuery {
            text: follow_up,
            round: Round::FollowUp,
        };
        self.gather(&follow_up_round, self.settings.follow_up_results, &mut sources)
            .await?;

        let user_prompt = prompt::final_prompt(
            query,
            &follow_up_round.text,
            &first_parsed.summary,
            sources.as_slice(),
        );
        let text = self
            .synthesis
            .complete(&self.request(FINAL_SYSTEM_PROMPT, user_prompt, self.settings.max_tokens))
            .await?;
        let parsed = parse_synthesis(&text);
        if parsed.insights.is_empty() {
            warn!("final synthesis contained no bullet insights");
        }

        let sources = sources.into_vec();
        info!(sources = sources.len(), "deep research complete");
        Ok(ResearchResult {
            original_query: query.to_string(),
            mode: Mode::Deep,
            follow_up_query: Some(follow_up_round.text),
            source_count: sources.len(),
            summary: parsed.summary,
            insights: parsed.insights,
            depth_gained: parsed.depth_gained,
            sources,
            timestamp: Utc::now(),
        })
    }

    /// Search, then synthesize. `None` when the search produced no usable sources.
    async fn first_round(&self, query: &str) -> Result<Option<FirstRound>, ResearchError> {
        let round = ResearchQuery {
            text: query.to_string(),
            round: Round::First,
        };
        let mut sources = SourceSet::new();
        self.gather(&round, self.settings.max_results, &mut sources)
            .await?;

        if sources.is_empty() {
            info!("no sources found; skipping synthesis");
            return Ok(None);
        }

        let user_prompt = prompt::synthesis_prompt(query, sources.as_slice());
        let text = self
            .synthesis
            .complete(&self.request(
                SYNTHESIS_SYSTEM_PROMPT,
                user_prompt,
                self.settings.max_tokens,
            ))
            .await?;
        let parsed = parse_synthesis(&text);
        if parsed.insights.is_empty() {
            warn!("synthesis contained no bullet insights; keeping whole text as summary");
        }

        Ok(Some(FirstRound { sources, parsed }))
    }

    async fn gather(
        &self,
        query: &ResearchQuery,
        max_results: usize,
        sources: &mut SourceSet,
    ) -> Result<(), ResearchError> {
        let round = query.round.number();
        info!(round, query = %query.text, "searching");

        let results = self
            .search
            .search(&query.text, max_results, USE_AUTOPROMPT)
            .await?;
        let returned = results.len();
        let added = sources.ingest(
            results,
            query.round,
            self.settings.max_content_chars,
            self.settings.min_content_chars,
        );

        info!(round, returned, added, "sources collected");
        Ok(())
    }

    async fn follow_up_query(&self, query: &str, first: &ParsedSynthesis) -> String {
        let user_prompt = prompt::follow_up_prompt(query, &first.summary, &first.insights);
        let request = self.request(FOLLOW_UP_SYSTEM_PROMPT, user_prompt, FOLLOW_UP_MAX_TOKENS);

        match self.synthesis.complete(&request).await {
            Ok(text) => match prompt::clean_follow_up_query(&text) {
                Some(follow_up) => {
                    debug!(%follow_up, "generated follow-up query");
                    follow_up
                }
                None => {
                    warn!("follow-up generation returned nothing usable; reusing original query");
                    query.to_string()
                }
            },
            Err(e) => {
                warn!(error = %e, "follow-up generation failed; reusing original query");
                query.to_string()
            }
        }
    }

    fn request(&self, system_prompt: &str, user_prompt: String, max_tokens: u32) -> SynthesisRequest {
        SynthesisRequest {
            system_prompt: system_prompt.to_string(),
            user_prompt,
            model: self.settings.model.clone(),
            max_tokens,
            temperature: self.settings.temperature,
        }
    }
}
