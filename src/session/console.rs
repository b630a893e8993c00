//! Line-oriented console driver for the interactive session.

use super::{parse_menu_input, SessionEvent, SessionState};
use crate::analysis::{BatchOutcome, Pipeline};
use crate::models::SearchQuery;
use crate::report::{generate_label_listing, generate_summary, RenderOptions};
use crate::scorer::SentimentScorer;
use crate::source::ContentProvider;
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

const MENU_HELP: &str = "Enter 1-7 (or a label name) to browse, b to go back, n for a new search, q to quit.";

/// Reads commands from `input`, writes everything to `output`.
pub struct Console<'a, S: SentimentScorer + ?Sized, P: ContentProvider, R, W> {
    pipeline: Pipeline<'a, S>,
    provider: &'a P,
    defaults: SearchQuery,
    options: RenderOptions,
    input: R,
    output: W,
}

impl<'a, S, P, R, W> Console<'a, S, P, R, W>
where
    S: SentimentScorer + ?Sized,
    P: ContentProvider,
    R: BufRead,
    W: Write,
{
    /// `defaults` pre-fills the subreddit, keyword and limit prompts.
    pub fn new(
        pipeline: Pipeline<'a, S>,
        provider: &'a P,
        defaults: SearchQuery,
        options: RenderOptions,
        input: R,
        output: W,
    ) -> Self {
        Self {
            pipeline,
            provider,
            defaults,
            options,
            input,
            output,
        }
    }

    /// Run until the user quits or input ends.
    pub async fn run(mut self) -> Result<()> {
        let mut state = SessionState::AwaitParameters;
        let mut current: Option<BatchOutcome> = None;

        writeln!(
            self.output,
            "sentiscope interactive session ({}). Press Ctrl-D to quit.",
            self.provider.describe()
        )?;

        while !state.is_done() {
            let event = match state {
                SessionState::AwaitParameters => match self.prompt_query()? {
                    None => SessionEvent::Quit,
                    Some(query) => match self.pipeline.run(self.provider, &query).await {
                        Ok(outcome) => {
                            current = Some(outcome);
                            SessionEvent::Submit(query)
                        }
                        Err(e) => {
                            warn!("Search failed: {:#}", e);
                            writeln!(self.output, "Search failed: {:#}\n", e)?;
                            continue;
                        }
                    },
                },
                _ => self.prompt_menu()?.unwrap_or(SessionEvent::Quit),
            };

            debug!("session event {:?}", event);
            state = match state.clone().next(event) {
                Ok(next) => next,
                Err(e) => {
                    writeln!(self.output, "{}. {}", e, MENU_HELP)?;
                    continue;
                }
            };
            self.render(&state, current.as_ref())?;
        }

        Ok(())
    }

    fn render(&mut self, state: &SessionState, outcome: Option<&BatchOutcome>) -> Result<()> {
        match (state, outcome) {
            (SessionState::Report { query }, Some(outcome)) => {
                writeln!(
                    self.output,
                    "\nr/{} \"{}\" ({} posts, {} comments)\n",
                    query.subreddit, query.keyword, outcome.posts, outcome.comments
                )?;
                write!(
                    self.output,
                    "{}",
                    generate_summary(&outcome.frequencies, self.options.bar_width)
                )?;
                match &outcome.daily {
                    Ok(series) if !series.is_empty() => {
                        writeln!(self.output, "\nDaily average sentiment:")?;
                        for (date, mean) in series.iter() {
                            writeln!(self.output, "  {}  {:+.3}", date, mean)?;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => writeln!(self.output, "\nDaily averages unavailable: {}", e)?,
                }
                writeln!(self.output, "\n{}", MENU_HELP)?;
            }
            (SessionState::Browsing { label, .. }, Some(outcome)) => {
                writeln!(self.output)?;
                write!(
                    self.output,
                    "{}",
                    generate_label_listing(&outcome.index, *label, self.options.preview_chars)
                )?;
                writeln!(self.output, "\n{}", MENU_HELP)?;
            }
            (SessionState::Done, _) => writeln!(self.output, "Goodbye.")?,
            _ => {}
        }
        Ok(())
    }

    /// Prompt for a search. `None` when input ends.
    fn prompt_query(&mut self) -> Result<Option<SearchQuery>> {
        let prompt = format!("Subreddit [{}]: ", self.defaults.subreddit);
        let Some(subreddit) = self.ask(&prompt)? else {
            return Ok(None);
        };
        let subreddit = match subreddit.trim_start_matches("r/") {
            "" => self.defaults.subreddit.clone(),
            name => name.to_string(),
        };

        let keyword = loop {
            let prompt = if self.defaults.keyword.is_empty() {
                "Keyword: ".to_string()
            } else {
                format!("Keyword [{}]: ", self.defaults.keyword)
            };
            let Some(keyword) = self.ask(&prompt)? else {
                return Ok(None);
            };
            if !keyword.is_empty() {
                break keyword;
            }
            if !self.defaults.keyword.is_empty() {
                break self.defaults.keyword.clone();
            }
            writeln!(self.output, "A keyword is required.")?;
        };

        let limit = loop {
            let prompt = format!("Limit [{}]: ", self.defaults.limit);
            let Some(limit) = self.ask(&prompt)? else {
                return Ok(None);
            };
            if limit.is_empty() {
                break self.defaults.limit;
            }
            match limit.parse::<usize>() {
                Ok(n) if n > 0 => break n,
                _ => writeln!(self.output, "Limit must be a positive number.")?,
            }
        };

        Ok(Some(SearchQuery {
            subreddit,
            keyword,
            limit,
            include_comments: self.defaults.include_comments,
        }))
    }

    /// Read menu lines until one parses. `None` when input ends.
    fn prompt_menu(&mut self) -> Result<Option<SessionEvent>> {
        loop {
            let Some(line) = self.ask("> ")? else {
                return Ok(None);
            };
            match parse_menu_input(&line) {
                Some(event) => return Ok(Some(event)),
                None if line.is_empty() => {}
                None => writeln!(self.output, "Unknown choice '{}'. {}", line, MENU_HELP)?,
            }
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
