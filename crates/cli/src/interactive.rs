use anyhow::{Context, Result};
use client::{SectionApi, MAX_TOP_N, MIN_TOP_N};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use session::{ContextProvider, PaperDirectory, QueryController, SearchForm};
use std::sync::Arc;
use tracing::debug;

use crate::view;

const HELP: &str = "Commands:
  <query>        search for sections
  :open N        show context for result N
  :close         close the context viewer
  :paper ID|all  filter by paper
  :top N         number of results (1-20)
  :papers        list papers available for filtering
  :help          show this help
  :quit          exit (or Ctrl+D)";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Open(usize),
    Close,
    Paper(Option<String>),
    Top(u32),
    Papers,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Some(Command::Search(line.to_string()));
    };

    let parts: Vec<&str> = rest.split_whitespace().collect();
    let command = match parts.as_slice() {
        ["open", n] => match n.parse::<usize>() {
            Ok(rank) if rank >= 1 => Command::Open(rank),
            _ => Command::Invalid(format!("invalid result number: {}", n)),
        },
        ["close"] => Command::Close,
        ["paper", "all"] => Command::Paper(None),
        ["paper", id] => Command::Paper(Some(id.to_string())),
        ["top", n] => match n.parse::<u32>() {
            Ok(top_n) => Command::Top(top_n),
            Err(_) => Command::Invalid(format!("invalid number: {}", n)),
        },
        ["papers"] => Command::Papers,
        ["help"] => Command::Help,
        ["quit"] | ["q"] | ["exit"] => Command::Quit,
        _ => Command::Invalid(format!("unknown command: {}", line)),
    };
    Some(command)
}

pub enum Flow {
    Continue(String),
    Quit,
}

/// Interactive search session wiring the three controllers together.
pub struct Session<A> {
    directory: PaperDirectory<A>,
    query: QueryController<A>,
    context: ContextProvider<A>,
    form: SearchForm,
}

impl<A: SectionApi> Session<A> {
    pub fn new(api: Arc<A>, top_n: u32, use_query_expansion: bool) -> Self {
        Self {
            directory: PaperDirectory::new(api.clone()),
            query: QueryController::new(api.clone()).with_query_expansion(use_query_expansion),
            context: ContextProvider::new(api),
            form: SearchForm {
                top_n,
                ..SearchForm::default()
            },
        }
    }

    /// Loads the paper directory. A failure only disables the paper filter.
    pub async fn start(&self) -> Option<String> {
        self.directory.activate().await;
        self.directory
            .error()
            .map(|e| format!("warning: paper list unavailable, searching all papers ({})", e))
    }

    pub fn prompt(&self) -> String {
        let filter = if self.form.paper_id.is_empty() {
            "all"
        } else {
            self.form.paper_id.as_str()
        };
        format!("search [{} · top {}]> ", filter, self.form.top_n)
    }

    pub async fn handle(&mut self, command: Command) -> Flow {
        debug!(?command, "handling command");
        let output = match command {
            Command::Search(text) => {
                self.form.query = text;
                match self.form.submit() {
                    Ok(params) => {
                        self.query.search(params).await;
                        view::render_query_state(&self.query.state())
                    }
                    Err(e) => format!("{}\n", e),
                }
            }
            Command::Open(rank) => {
                let chunk_id = self
                    .query
                    .results()
                    .and_then(|r| r.get_rank(rank).map(|p| p.chunk_id.clone()));
                match chunk_id {
                    Some(id) => {
                        self.context.select(Some(id)).await;
                        view::render_context_state(&self.context.state())
                    }
                    None => format!("no result #{}\n", rank),
                }
            }
            Command::Close => {
                self.context.select(None).await;
                "context closed\n".to_string()
            }
            Command::Paper(None) => {
                self.form.paper_id.clear();
                format!("filter: {}\n", view::ALL_PAPERS)
            }
            Command::Paper(Some(id)) => {
                if self.directory.error().is_some() {
                    format!("paper filter unavailable, only {} can be searched\n", view::ALL_PAPERS)
                } else if let Some(paper) = self.directory.find(&id) {
                    self.form.paper_id = paper.paper_id;
                    format!("filter: {}\n", paper.title)
                } else {
                    format!("unknown paper: {}\n", id)
                }
            }
            Command::Top(n) if (MIN_TOP_N..=MAX_TOP_N).contains(&n) => {
                self.form.top_n = n;
                format!("top {}\n", n)
            }
            Command::Top(n) => format!("top must be between {} and {}, got {}\n", MIN_TOP_N, MAX_TOP_N, n),
            Command::Papers => {
                let papers = self.directory.papers();
                let options = view::filter_options(&papers, self.directory.error().as_deref());
                view::render_filter_options(&options)
            }
            Command::Help => format!("{}\n", HELP),
            Command::Quit => return Flow::Quit,
            Command::Invalid(message) => format!("{}\n", message),
        };
        Flow::Continue(output)
    }
}

pub async fn run<A: SectionApi>(mut session: Session<A>) -> Result<()> {
    println!("Section Finder — find relevant sections of biomedical papers.");
    println!("{}\n", HELP);

    if let Some(warning) = session.start().await {
        eprintln!("{}", warning);
    }

    let mut rl = DefaultEditor::new().context("Failed to create readline editor")?;

    loop {
        match rl.readline(&session.prompt()) {
            Ok(line) => {
                let Some(command) = parse_command(&line) else {
                    continue;
                };
                rl.add_history_entry(line.trim()).ok();

                match session.handle(command).await {
                    Flow::Continue(output) => print!("{}", output),
                    Flow::Quit => break,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use client::{
        ApiError, ApiResult, Chunk, ChunkContext, Confidence, Paper, QueryRequest, QueryResponse,
        SectionPointer,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubApi {
        papers_down: bool,
        queries: Mutex<Vec<QueryRequest>>,
        contexts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SectionApi for StubApi {
        async fn submit_query(&self, request: &QueryRequest) -> ApiResult<QueryResponse> {
            self.queries.lock().unwrap().push(request.clone());
            let results = (1..=2)
                .map(|i| SectionPointer {
                    paper_title: "Cardiac safety".to_string(),
                    paper_id: "p1".to_string(),
                    pmid: None,
                    doi: None,
                    section_path: format!("Results {}", i),
                    page_start: i,
                    page_end: i,
                    snippets: vec![],
                    confidence: Confidence::Low,
                    chunk_id: format!("c{}", i),
                    reranker_score: 0.1,
                })
                .collect();
            Ok(QueryResponse {
                results,
                query_used: request.query.clone(),
                total: 2,
            })
        }

        async fn list_papers(&self) -> ApiResult<Vec<Paper>> {
            if self.papers_down {
                return Err(ApiError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(vec![Paper {
                paper_id: "p1".to_string(),
                title: "Cardiac safety".to_string(),
                pmid: None,
                doi: None,
                source_url: None,
                chunk_count: 4,
            }])
        }

        async fn chunk_context(&self, chunk_id: &str) -> ApiResult<ChunkContext> {
            self.contexts.lock().unwrap().push(chunk_id.to_string());
            Ok(ChunkContext {
                prev: None,
                current: Chunk {
                    chunk_id: chunk_id.to_string(),
                    paper_id: "p1".to_string(),
                    chunk_type: "paragraph".to_string(),
                    section_path: vec!["Results".to_string()],
                    page_start: 1,
                    page_end: 1,
                    text: format!("text of {}", chunk_id),
                },
                next: None,
            })
        }
    }

    fn output(flow: Flow) -> String {
        match flow {
            Flow::Continue(output) => output,
            Flow::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("   "), None);
        assert_eq!(
            parse_command(" qt prolongation "),
            Some(Command::Search("qt prolongation".to_string()))
        );
        assert_eq!(parse_command(":open 2"), Some(Command::Open(2)));
        assert!(matches!(parse_command(":open 0"), Some(Command::Invalid(_))));
        assert_eq!(parse_command(":paper all"), Some(Command::Paper(None)));
        assert_eq!(parse_command(":paper p1"), Some(Command::Paper(Some("p1".to_string()))));
        assert_eq!(parse_command(":top 12"), Some(Command::Top(12)));
        assert_eq!(parse_command(":q"), Some(Command::Quit));
        assert!(matches!(parse_command(":frobnicate"), Some(Command::Invalid(_))));
    }

    #[tokio::test]
    async fn test_search_then_open_context() {
        let api = Arc::new(StubApi::default());
        let mut session = Session::new(api.clone(), 8, true);
        session.start().await;

        let rendered = output(session.handle(Command::Search("qt".to_string())).await);
        assert!(rendered.starts_with("2 results for: qt"));

        let rendered = output(session.handle(Command::Open(2)).await);
        assert!(rendered.contains(">> text of c2"));

        output(session.handle(Command::Open(2)).await);
        assert_eq!(*api.contexts.lock().unwrap(), vec!["c2".to_string()]);

        output(session.handle(Command::Close).await);
        output(session.handle(Command::Open(2)).await);
        assert_eq!(api.contexts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_open_without_results() {
        let mut session = Session::new(Arc::new(StubApi::default()), 8, true);

        let rendered = output(session.handle(Command::Open(1)).await);
        assert_eq!(rendered, "no result #1\n");
    }

    #[tokio::test]
    async fn test_filter_and_top_n_reach_the_request() {
        let api = Arc::new(StubApi::default());
        let mut session = Session::new(api.clone(), 8, false);
        session.start().await;

        output(session.handle(Command::Paper(Some("p1".to_string()))).await);
        output(session.handle(Command::Top(3)).await);
        output(session.handle(Command::Search("hERG".to_string())).await);

        let queries = api.queries.lock().unwrap();
        assert_eq!(queries[0].paper_id.as_deref(), Some("p1"));
        assert_eq!(queries[0].top_n, Some(3));
        assert_eq!(queries[0].use_query_expansion, Some(false));
    }

    #[tokio::test]
    async fn test_unknown_paper_and_bad_top_n_are_rejected() {
        let api = Arc::new(StubApi::default());
        let mut session = Session::new(api, 8, true);
        session.start().await;

        let rendered = output(session.handle(Command::Paper(Some("nope".to_string()))).await);
        assert!(rendered.starts_with("unknown paper"));
        let rendered = output(session.handle(Command::Top(50)).await);
        assert!(rendered.contains("between 1 and 20"));
        assert_eq!(session.prompt(), "search [all · top 8]> ");
    }

    #[tokio::test]
    async fn test_directory_failure_degrades_filter() {
        let api = Arc::new(StubApi {
            papers_down: true,
            ..StubApi::default()
        });
        let mut session = Session::new(api, 8, true);

        let warning = session.start().await.unwrap();
        assert!(warning.contains("503"));

        let rendered = output(session.handle(Command::Papers).await);
        assert_eq!(rendered.lines().count(), 1);
        assert!(rendered.contains(view::ALL_PAPERS));

        let rendered = output(session.handle(Command::Paper(Some("p1".to_string()))).await);
        assert!(rendered.contains("unavailable"));
    }
}
