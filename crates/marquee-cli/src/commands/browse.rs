use std::io::{stdout, Stdout, Write};
use std::sync::{Arc, Mutex};

use color_eyre::Result;
use crossterm::{
    cursor::MoveTo,
    event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use marquee_core::{DetailController, DetailState, Key, KeyRouter, SearchController, SearchState};
use marquee_sources::{MetadataSource, TrailerSource};
use owo_colors::OwoColorize;
use tokio::sync::mpsc;

use super::AppContext;
use crate::output::Output;

/// The upstream pages ten results at a time; the shell never shows more.
const RESULT_ROWS: usize = 10;

const DEFAULT_TITLE: &str = "Movie Theatre";

/// Focus zones for key handling. With the input focused, printable keys
/// edit the query and every edit re-triggers the search; the result list
/// takes the arrow keys either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    List,
}

pub async fn run_browse(output: &Output) -> Result<()> {
    let ctx = AppContext::build()?;
    if !ctx.config.is_search_configured() {
        output.warn("OMDb API key is not configured; run `marquee config` first");
        return Ok(());
    }
    if !ctx.config.is_trailer_configured() {
        tracing::info!("YouTube API key not configured, trailer lookup disabled");
    }

    terminal::enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let result = event_loop(&ctx).await;
    execute!(stdout(), LeaveAlternateScreen, SetTitle(""))?;
    terminal::disable_raw_mode()?;
    result
}

async fn event_loop(ctx: &AppContext) -> Result<()> {
    let search = Arc::new(SearchController::new(
        ctx.metadata.clone() as Arc<dyn MetadataSource>
    ));
    let detail = Arc::new(DetailController::new(
        ctx.metadata.clone() as Arc<dyn MetadataSource>,
        ctx.trailers.clone() as Arc<dyn TrailerSource>,
        Arc::clone(&ctx.watchlist),
    ));

    let focus = Arc::new(Mutex::new(Focus::Input));
    let router = KeyRouter::new();

    // Enter refocuses and clears the search input, ignored if focus is
    // already there.
    let _refocus_binding = {
        let focus = Arc::clone(&focus);
        let search = Arc::clone(&search);
        router.bind(&[Key::Enter], move || {
            let mut focus = focus.lock().unwrap();
            if *focus == Focus::Input {
                return;
            }
            *focus = Focus::Input;
            search.set_query("");
        })
    };

    // Escape or Backspace closes the open popup.
    let _close_binding = {
        let detail = Arc::clone(&detail);
        router.bind(&[Key::Escape, Key::Backspace], move || {
            if detail.state().open {
                detail.close();
            }
        })
    };

    // Terminal events arrive on a blocking reader thread.
    let (tx, mut keys) = mpsc::channel::<KeyEvent>(32);
    std::thread::spawn(move || loop {
        match crossterm::event::read() {
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                if tx.blocking_send(key).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    });

    let mut search_rx = search.subscribe();
    let mut detail_rx = detail.subscribe();
    let mut selected = 0usize;
    let mut watchlist_open = false;

    search.set_query("");

    loop {
        render(
            &search.state(),
            &detail.state(),
            ctx,
            *focus.lock().unwrap(),
            selected,
            watchlist_open,
        )?;

        tokio::select! {
            maybe_key = keys.recv() => {
                let Some(key) = maybe_key else { break };
                if is_quit(&key, *focus.lock().unwrap(), detail.state().open) {
                    break;
                }
                handle_key(key, &router, &search, &detail, &focus, &mut selected, &mut watchlist_open);
            }
            _ = search_rx.changed() => {}
            _ = detail_rx.changed() => {}
        }
    }

    Ok(())
}

fn is_quit(key: &KeyEvent, focus: Focus, popup_open: bool) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    // 'q' only quits where it cannot be query input
    key.code == KeyCode::Char('q') && focus == Focus::List && !popup_open
}

fn handle_key(
    key: KeyEvent,
    router: &KeyRouter,
    search: &SearchController,
    detail: &DetailController,
    focus: &Arc<Mutex<Focus>>,
    selected: &mut usize,
    watchlist_open: &mut bool,
) {
    let popup_open = detail.state().open;

    match key.code {
        KeyCode::Enter => router.dispatch(Key::Enter),
        KeyCode::Esc => router.dispatch(Key::Escape),
        KeyCode::Backspace => {
            if popup_open {
                router.dispatch(Key::Backspace);
            } else if *focus.lock().unwrap() == Focus::Input {
                let mut query = search.state().query;
                if query.pop().is_some() {
                    *selected = 0;
                    search.set_query(query);
                }
            }
        }
        KeyCode::Tab => {
            let mut focus = focus.lock().unwrap();
            *focus = match *focus {
                Focus::Input => Focus::List,
                Focus::List => Focus::Input,
            };
        }
        KeyCode::Up => *selected = selected.saturating_sub(1),
        KeyCode::Down => {
            let count = visible_results(&search.state());
            if count > 0 {
                *selected = (*selected + 1).min(count - 1);
            }
        }
        KeyCode::Right => {
            if !popup_open {
                open_selected(search, detail, *selected);
            }
        }
        KeyCode::Char(c) if popup_open => match c {
            'w' => {
                detail.add_to_watchlist();
            }
            't' => detail.toggle_trailer(),
            _ => {}
        },
        KeyCode::Char(c) => {
            let focused = *focus.lock().unwrap();
            match focused {
                Focus::Input => {
                    let mut query = search.state().query;
                    query.push(c);
                    *selected = 0;
                    search.set_query(query);
                }
                Focus::List => match c {
                    'o' => open_selected(search, detail, *selected),
                    'l' => *watchlist_open = !*watchlist_open,
                    _ => {}
                },
            }
        }
        _ => {}
    }
}

fn open_selected(search: &SearchController, detail: &DetailController, selected: usize) {
    let state = search.state();
    if let Some(movie) = state.movies.iter().take(RESULT_ROWS).nth(selected) {
        detail.select(movie.imdb_id.clone());
    }
}

fn visible_results(state: &SearchState) -> usize {
    state.movies.len().min(RESULT_ROWS)
}

fn put(out: &mut Stdout, row: &mut u16, text: String) -> Result<()> {
    queue!(out, MoveTo(0, *row), Print(text))?;
    *row += 1;
    Ok(())
}

fn render(
    search: &SearchState,
    detail: &DetailState,
    ctx: &AppContext,
    focus: Focus,
    selected: usize,
    watchlist_open: bool,
) -> Result<()> {
    let mut out = stdout();

    // The "document title" side effect from the state's display title.
    let title = if detail.open {
        detail.display_title().unwrap_or(DEFAULT_TITLE)
    } else {
        DEFAULT_TITLE
    };
    queue!(out, SetTitle(title), Clear(ClearType::All), MoveTo(0, 0))?;

    let mut row = 0u16;

    put(
        &mut out,
        &mut row,
        format!(
            "{}   Watch later ({})",
            DEFAULT_TITLE.bold(),
            ctx.watchlist.len()
        ),
    )?;
    let cursor = if focus == Focus::Input { "▌" } else { "" };
    put(&mut out, &mut row, format!("Search: {}{}", search.query, cursor))?;
    put(&mut out, &mut row, String::new())?;

    if search.loading {
        put(&mut out, &mut row, "Loading movies...".to_string())?;
    } else if let Some(message) = &search.message {
        put(&mut out, &mut row, format!("{}", message.yellow()))?;
    }

    if !search.loading {
        let shown = selected.min(visible_results(search).saturating_sub(1));
        for (index, movie) in search.movies.iter().take(RESULT_ROWS).enumerate() {
            let marker = if index == shown && focus == Focus::List {
                ">"
            } else {
                " "
            };
            put(
                &mut out,
                &mut row,
                format!("{marker} {}  {}", movie.imdb_id.dimmed(), movie.title),
            )?;
        }
    }

    if watchlist_open {
        put(&mut out, &mut row, String::new())?;
        put(&mut out, &mut row, format!("{}", "Watch later".bold()))?;
        let entries = ctx.watchlist.entries();
        if entries.is_empty() {
            put(&mut out, &mut row, "Nothing to see here.".to_string())?;
        }
        for entry in entries {
            let duration = entry
                .runtime_minutes
                .map(|m| format!("{m} mins"))
                .unwrap_or_else(|| "?".to_string());
            let genre = entry.genre.unwrap_or_default();
            put(
                &mut out,
                &mut row,
                format!("  {}  {genre}  {duration}", entry.title),
            )?;
        }
    }

    if detail.open {
        put(&mut out, &mut row, String::new())?;
        put(
            &mut out,
            &mut row,
            format!("{}", "PRESS ESCAPE OR BACKSPACE TO EXIT".dimmed()),
        )?;
        if detail.loading {
            put(&mut out, &mut row, "Loading movies...".to_string())?;
        } else if let Some(details) = &detail.details {
            put(&mut out, &mut row, format!("{}", details.title.bold()))?;
            let lines = [
                ("Language", &details.language),
                ("Genre", &details.genre),
                ("Released on", &details.released),
                ("IMDb rating", &details.imdb_rating),
                ("Story", &details.plot),
                ("Duration", &details.runtime),
                ("Starring", &details.actors),
                ("Directed by", &details.director),
            ];
            for (label, value) in lines {
                if let Some(value) = value {
                    put(&mut out, &mut row, format!("{label}: {value}"))?;
                }
            }

            if detail.trailer_open {
                let line = match (&detail.trailer_url, detail.trailer_resolved) {
                    (Some(url), _) => format!("Trailer: {url}"),
                    (None, true) => "No trailer available".to_string(),
                    (None, false) => "Looking for a trailer...".to_string(),
                };
                put(&mut out, &mut row, line)?;
            }

            let save = if detail.just_added {
                format!("{}", "✔ DONE".green())
            } else {
                "[w] WATCH LATER".to_string()
            };
            let trailer = if detail.trailer_open {
                "[t] CLOSE TRAILER"
            } else {
                "[t] ▶ TRAILER"
            };
            put(&mut out, &mut row, format!("{save}   {trailer}"))?;
        }
        if let Some(notice) = &detail.notice {
            put(&mut out, &mut row, format!("{}", notice.yellow()))?;
        }
    }

    put(&mut out, &mut row, String::new())?;
    let hint = match (detail.open, focus) {
        (true, _) => "esc/backspace close · w save · t trailer · ctrl+c quit",
        (false, Focus::Input) => "type to search · tab list · ↑/↓ move · → open · ctrl+c quit",
        (false, Focus::List) => "o/→ open · l watch later · enter clear search · q quit",
    };
    put(&mut out, &mut row, format!("{}", hint.dimmed()))?;

    out.flush()?;
    Ok(())
}
