use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use ttyprompt::testsupport::ScriptedTerminal;
use ttyprompt::{
    Answer, AutocompleteConfig, Behavior, PrefixSearch, Prompt, PromptConfig, PromptOptions,
};
use ttyprompt_pty::terminal::Terminal;
use ttyprompt_store::history::FileHistory;

const UP: &[u8] = b"\x1b[A";
const DOWN: &[u8] = b"\x1b[B";
const RIGHT: &[u8] = b"\x1b[C";
const LEFT: &[u8] = b"\x1b[D";

/// Replay everything the prompt wrote on a vt100 screen.
fn screen(term: &ScriptedTerminal) -> vt100::Parser {
    let (cols, rows) = term.size();
    let mut parser = vt100::Parser::new(rows, cols, 0);
    let (row, col) = term.start_position();
    parser.process(format!("\x1b[{};{}H", row, col).as_bytes());
    parser.process(&term.screen_bytes());
    parser
}

fn get_row(parser: &vt100::Parser, row: usize) -> String {
    let cols = parser.screen().size().1;
    parser
        .screen()
        .rows(0, cols)
        .nth(row)
        .unwrap_or_default()
        .trim_end()
        .to_string()
}

fn completion(behavior: Behavior, fill: bool) -> PromptConfig {
    PromptConfig {
        autocomplete: AutocompleteConfig {
            behavior: Some(behavior),
            fill: Some(fill),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn read(term: ScriptedTerminal, options: PromptOptions) -> (Answer, ScriptedTerminal) {
    let prompt = Prompt::with_terminal(term, options).unwrap();
    let answer = prompt.read("> ", ()).unwrap();
    (answer, prompt.into_terminal())
}

fn line(s: &str) -> Answer {
    Answer::Line(s.to_string())
}

#[test]
fn test_typed_line_shown_and_returned() {
    let term = ScriptedTerminal::new(40, 5).typed("hello world").keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("hello world"));
    let parser = screen(&term);
    assert_eq!(get_row(&parser, 0), "> hello world");
    assert_eq!(parser.screen().cursor_position(), (1, 0), "newline after accept");
}

#[test]
fn test_question_lead_lines_printed_before_prompt() {
    let term = ScriptedTerminal::new(40, 5).at(2, 1).keys(b"y\r");
    let prompt = Prompt::with_terminal(term, PromptOptions::new()).unwrap();
    assert_eq!(prompt.read("Install?\n[y/n] ", ()).unwrap(), line("y"));
    let out = prompt.terminal().output_text();
    assert!(out.starts_with("Install?\n"));
}

#[test]
fn test_global_default_used_for_empty_line() {
    let config = PromptConfig {
        default_response: Some("blue".into()),
        ..Default::default()
    };
    let term = ScriptedTerminal::new(40, 5).keys(b"\r\r");
    let prompt = Prompt::with_terminal(term, config).unwrap();
    assert_eq!(prompt.ask("colour? ").unwrap().as_deref(), Some("blue"));
    assert_eq!(prompt.ask_with("colour? ", "red").unwrap().as_deref(), Some("red"));
}

#[test]
fn test_masked_input_draws_echo() {
    let config = PromptConfig {
        echo: Some("*".into()),
        ..Default::default()
    };
    let term = ScriptedTerminal::new(40, 5).typed("secret").keys(b"\r");
    let (answer, term) = read(term, config.into());
    assert_eq!(answer, line("secret"));
    let parser = screen(&term);
    assert_eq!(get_row(&parser, 0), "> ******");
    assert!(!term.output_text().contains("secret"));
}

#[test]
fn test_masked_backspace_erases_echo_cells() {
    let config = PromptConfig {
        echo: Some("<>".into()),
        ..Default::default()
    };
    let term = ScriptedTerminal::new(40, 5).typed("abc").keys(&[127]).keys(b"\r");
    let (answer, term) = read(term, config.into());
    assert_eq!(answer, line("ab"));
    assert_eq!(get_row(&screen(&term), 0), "> <><>");
}

#[test]
fn test_masked_ignores_arrows() {
    let config = PromptConfig {
        echo: Some("*".into()),
        ..Default::default()
    };
    let term = ScriptedTerminal::new(40, 5)
        .typed("ab")
        .chunk(LEFT)
        .typed("c")
        .keys(b"\r");
    let (answer, _) = read(term, config.into());
    assert_eq!(answer, line("abc"));
}

#[test]
fn test_hide_draws_nothing() {
    let term = ScriptedTerminal::new(40, 5).typed("hunter2").keys(b"\r");
    let prompt = Prompt::with_terminal(term, PromptOptions::new()).unwrap();
    assert_eq!(prompt.hide("Password: ").unwrap().as_deref(), Some("hunter2"));
    let term = prompt.into_terminal();
    assert!(!term.output_text().contains("hunter2"));
    assert_eq!(get_row(&screen(&term), 0), "Password:");
}

#[test]
fn test_sigint_returns_interrupted() {
    let term = ScriptedTerminal::new(40, 5).typed("par").keys(&[3]);
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, Answer::Interrupted);
    assert!(term.output_text().ends_with("^C\n"));
    assert!(!term.is_open());
    assert!(!term.is_raw());
}

#[test]
fn test_sigint_configured_to_exit() {
    let config = PromptConfig {
        sigint: Some(true),
        ..Default::default()
    };
    let term = ScriptedTerminal::new(40, 5).keys(&[3]);
    let (answer, term) = read(term, config.into());
    assert_eq!(answer, Answer::Exit(130));
    assert_eq!(term.close_count(), 1);
}

#[test]
fn test_backspace_at_start_is_noop() {
    let term = ScriptedTerminal::new(40, 5)
        .typed("ab")
        .chunk(LEFT)
        .chunk(LEFT)
        .keys(&[127])
        .keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("ab"));
    assert_eq!(get_row(&screen(&term), 0), "> ab");
}

#[test]
fn test_backspace_in_middle() {
    let term = ScriptedTerminal::new(40, 5)
        .typed("abc")
        .chunk(LEFT)
        .keys(&[127])
        .keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("ac"));
    assert_eq!(get_row(&screen(&term), 0), "> ac");
}

#[test]
fn test_insert_after_moving_left_and_right() {
    let term = ScriptedTerminal::new(40, 5)
        .typed("held")
        .chunk(LEFT)
        .chunk(LEFT)
        .typed("l")
        .chunk(RIGHT)
        .chunk(RIGHT)
        .chunk(RIGHT)
        .typed("!")
        .keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("helld!"));
    assert_eq!(get_row(&screen(&term), 0), "> helld!");
}

#[test]
fn test_paste_is_sanitized() {
    let term = ScriptedTerminal::new(40, 5)
        .chunk(b"a\0b")
        .chunk(b"\x1b[1m")
        .chunk(b"c")
        .keys(b"\r");
    let (answer, _) = read(term, PromptOptions::new());
    assert_eq!(answer, line("abc"));
}

#[test]
fn test_wide_characters() {
    let term = ScriptedTerminal::new(40, 5)
        .typed("你好")
        .chunk(LEFT)
        .typed("x")
        .keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("你x好"));
    assert_eq!(get_row(&screen(&term), 0), "> 你x好");
}

#[test]
fn test_wide_char_pushed_to_next_row() {
    // "> abcdefg" leaves one cell on the row, too narrow for the wide char.
    let term = ScriptedTerminal::new(10, 5)
        .typed("abcdefg你z")
        .chunk(LEFT)
        .typed("Q")
        .keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("abcdefg你Qz"));
    let parser = screen(&term);
    assert_eq!(get_row(&parser, 0), "> abcdefg");
    assert_eq!(get_row(&parser, 1), "你Qz");
}

#[test]
fn test_arrows_step_over_skipped_cell() {
    // Back onto "g", forward onto the wide char again, then insert.
    let term = ScriptedTerminal::new(10, 5)
        .typed("abcdefg你z")
        .chunk(LEFT)
        .chunk(LEFT)
        .chunk(LEFT)
        .chunk(RIGHT)
        .typed("Y")
        .keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("abcdefgY你z"));
    let parser = screen(&term);
    assert_eq!(get_row(&parser, 0), "> abcdefgY");
    assert_eq!(get_row(&parser, 1), "你z");
}

#[test]
fn test_insert_before_pushed_wide_char_redraws_it() {
    let term = ScriptedTerminal::new(10, 5)
        .typed("abcdefg你z")
        .chunk(LEFT)
        .chunk(LEFT)
        .chunk(LEFT)
        .typed("X")
        .keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("abcdefXg你z"));
    let parser = screen(&term);
    assert_eq!(get_row(&parser, 0), "> abcdefXg");
    assert_eq!(get_row(&parser, 1), "你z");
    assert_eq!(parser.screen().cursor_position(), (2, 0));
}

#[test]
fn test_pasted_line_with_enter_accepts() {
    let term = ScriptedTerminal::new(40, 5).chunk(b"ab\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("ab"));
    assert_eq!(get_row(&screen(&term), 0), "> ab");
}

#[test]
fn test_input_wraps_onto_next_row() {
    let term = ScriptedTerminal::new(10, 5).typed("abcdefghijk").keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("abcdefghijk"));
    let parser = screen(&term);
    assert_eq!(get_row(&parser, 0), "> abcdefgh");
    assert_eq!(get_row(&parser, 1), "ijk");
}

#[test]
fn test_full_row_then_arrow_back_keeps_wrap() {
    // The row fills exactly, the cursor steps away and back, then typing
    // must continue on the next row without overwriting the last cell.
    let term = ScriptedTerminal::new(10, 5)
        .typed("abcdefgh")
        .chunk(LEFT)
        .chunk(RIGHT)
        .typed("i")
        .keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("abcdefghi"));
    let parser = screen(&term);
    assert_eq!(get_row(&parser, 0), "> abcdefgh");
    assert_eq!(get_row(&parser, 1), "i");
}

#[test]
fn test_backspace_across_row_boundary() {
    let term = ScriptedTerminal::new(10, 5)
        .typed("abcdefghij")
        .keys(&[127, 127, 127])
        .keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("abcdefg"));
    let parser = screen(&term);
    assert_eq!(get_row(&parser, 0), "> abcdefg");
    assert_eq!(get_row(&parser, 1), "");
}

#[test]
fn test_input_at_bottom_scrolls() {
    let term = ScriptedTerminal::new(10, 3).at(3, 1).typed("abcdefghijkl").keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("abcdefghijkl"));
    let parser = screen(&term);
    // One scroll for the wrap, one more for the final newline.
    assert_eq!(get_row(&parser, 0), "> abcdefgh");
    assert_eq!(get_row(&parser, 1), "ijkl");
}

#[test]
fn test_up_down_move_between_rows_without_history() {
    let term = ScriptedTerminal::new(10, 5)
        .typed("abcdefghijklmno")
        .chunk(UP)
        .typed("X")
        .chunk(DOWN)
        .typed("Y")
        .keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new());
    assert_eq!(answer, line("abcdeXfghijklmnoY"));
    let parser = screen(&term);
    assert_eq!(get_row(&parser, 0), "> abcdeXfg");
    assert_eq!(get_row(&parser, 1), "hijklmnoY");
}

#[test]
fn test_cycle_visits_each_result_then_wraps() {
    let search = |_: &str| vec!["CAT".to_string(), "CRANBERRY".into(), "CORE".into()];
    let options = || PromptOptions::new().search(search).config(completion(Behavior::Cycle, false));

    let term = ScriptedTerminal::new(40, 5).typed("C").keys(b"\t\t\t").keys(b"\r");
    let (answer, term) = read(term, options());
    assert_eq!(answer, line("CORE"));
    assert_eq!(get_row(&screen(&term), 0), "> CORE");

    let term = ScriptedTerminal::new(40, 5).typed("C").keys(b"\t\t\t\t").keys(b"\r");
    let (answer, _) = read(term, options());
    assert_eq!(answer, line("CAT"));
}

#[test]
fn test_cycle_run_resets_after_typing() {
    let options = PromptOptions::new()
        .search(PrefixSearch::new(["cat", "car", "dog", "door"]))
        .config(completion(Behavior::Cycle, false));
    let term = ScriptedTerminal::new(40, 5)
        .typed("c")
        .keys(b"\t")
        .keys(&[127, 127, 127])
        .typed("d")
        .keys(b"\t\t")
        .keys(b"\r");
    let (answer, _) = read(term, options);
    assert_eq!(answer, line("door"));
}

#[test]
fn test_cycle_without_results_writes_tab() {
    let options = PromptOptions::new()
        .search(PrefixSearch::new(["apple"]))
        .config(completion(Behavior::Cycle, false));
    let term = ScriptedTerminal::new(40, 5).typed("z").keys(b"\t").keys(b"\r");
    let (answer, term) = read(term, options);
    assert_eq!(answer, line("z"));
    assert!(term.output_text().contains('\t'));
}

#[test]
fn test_trigger_without_search_is_ignored() {
    let term = ScriptedTerminal::new(40, 5).typed("a").keys(b"\t").typed("b").keys(b"\r");
    let (answer, _) = read(term, PromptOptions::new());
    assert_eq!(answer, line("ab"));
}

#[test]
fn test_suggest_single_match_fills_without_table() {
    let options = PromptOptions::new()
        .search(PrefixSearch::new(["apple", "banana"]))
        .config(completion(Behavior::Suggest, false));
    let term = ScriptedTerminal::new(40, 5).typed("ba").keys(b"\t").keys(b"\r");
    let (answer, term) = read(term, options);
    assert_eq!(answer, line("banana"));
    let parser = screen(&term);
    assert_eq!(get_row(&parser, 0), "> banana");
    assert_eq!(get_row(&parser, 1), "");
}

#[test]
fn test_suggest_fill_and_table() {
    let options = PromptOptions::new()
        .search(PrefixSearch::new(["international", "interval", "internet"]))
        .config(completion(Behavior::Suggest, true));
    let term = ScriptedTerminal::new(40, 5).typed("in").keys(b"\t");
    let prompt = Prompt::with_terminal(term, options).unwrap();
    // Typing clears the table; "interna" then narrows to one result.
    prompt.terminal_mut().push_typed("na");
    prompt.terminal_mut().push_keys(b"\t\r");
    assert_eq!(prompt.read("> ", ()).unwrap(), line("international"));
    let parser = screen(&prompt.terminal());
    assert_eq!(get_row(&parser, 0), "> international");
    assert_eq!(get_row(&parser, 1), "", "table cleared on accept");
}

#[test]
fn test_suggest_table_is_drawn_below_input() {
    let options = PromptOptions::new()
        .search(PrefixSearch::new(["international", "interval", "internet"]))
        .config(completion(Behavior::Suggest, true));
    // Interrupt while the table is up; the table is cleared, so look at the
    // raw output for what was drawn.
    let term = ScriptedTerminal::new(40, 5).typed("in").keys(b"\t");
    let prompt = Prompt::with_terminal(term, options).unwrap();
    prompt.terminal_mut().push_keys(&[3]);
    assert_eq!(prompt.read("> ", ()).unwrap(), Answer::Interrupted);
    let out = prompt.terminal().output_text();
    assert!(out.contains("international  interval  internet"));
    assert!(out.contains("inter"));
}

#[test]
fn test_suggest_table_at_bottom_scrolls_and_truncates() {
    let options = PromptOptions::new()
        .search(PrefixSearch::new(["international", "interval", "internet"]))
        .config(completion(Behavior::Suggest, false));
    let term = ScriptedTerminal::new(40, 4).at(4, 1).typed("in").keys(b"\t").keys(b"\r");
    let (answer, term) = read(term, options);
    assert_eq!(answer, line("in"));
    assert!(term.output_text().contains("1 more…"));
    let parser = screen(&term);
    // The table pushed the prompt up one row; the final newline adds none
    // because the cleared table row is reused.
    assert_eq!(get_row(&parser, 2), "> in");
    assert_eq!(get_row(&parser, 3), "");
}

#[test]
fn test_sticky_suggest_runs_on_every_key() {
    let config = PromptConfig {
        autocomplete: AutocompleteConfig {
            behavior: Some(Behavior::Suggest),
            sticky: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };
    let options = PromptOptions::new()
        .search(PrefixSearch::new(["zebra", "apple", "apricot"]))
        .config(config);
    // "z" alone matches one entry and fills it; no tab is ever written.
    let term = ScriptedTerminal::new(40, 5).typed("z").keys(b"\r");
    let (answer, term) = read(term, options);
    assert_eq!(answer, line("zebra"));
    assert!(!term.output_text().contains('\t'));
}

#[test]
fn test_hybrid_cycles_with_table() {
    let search = |_: &str| vec!["one".to_string(), "two".into(), "three".into()];
    let options = PromptOptions::new()
        .search(search)
        .config(completion(Behavior::Hybrid, false));
    let term = ScriptedTerminal::new(40, 5).keys(b"\t\t").keys(b"\r");
    let (answer, term) = read(term, options);
    assert_eq!(answer, line("two"));
    assert!(term.output_text().contains("one  two  three"));
    let parser = screen(&term);
    assert_eq!(get_row(&parser, 0), "> two");
    assert_eq!(get_row(&parser, 1), "");
}

#[test]
fn test_custom_trigger_key() {
    let config = PromptConfig {
        autocomplete: AutocompleteConfig {
            trigger_key: Some(b'`'),
            ..Default::default()
        },
        ..Default::default()
    };
    let options = PromptOptions::new()
        .search(PrefixSearch::new(["gamma"]))
        .config(config);
    let term = ScriptedTerminal::new(40, 5).typed("g`").keys(b"\r");
    let (answer, _) = read(term, options);
    assert_eq!(answer, line("gamma"));
}

#[test]
fn test_history_navigation_restores_draft() {
    let history = Rc::new(RefCell::new(FileHistory::in_memory()));
    let options = PromptOptions::new().history(history.clone());
    let mut term = ScriptedTerminal::new(40, 5);
    term.push_typed("Good\r");
    term.push_typed("Yes\r");
    // Third prompt: up, up, down shows "Yes".
    term.push_typed("draft");
    term.push_chunk(UP);
    term.push_chunk(UP);
    term.push_chunk(DOWN);
    term.push_keys(b"\r");
    // Fourth prompt: up then down past the newest entry restores the draft.
    term.push_typed("wip");
    term.push_chunk(UP);
    term.push_chunk(DOWN);
    term.push_keys(b"\r");

    let prompt = Prompt::with_terminal(term, options).unwrap();
    assert_eq!(prompt.read("> ", ()).unwrap(), line("Good"));
    assert_eq!(prompt.read("> ", ()).unwrap(), line("Yes"));
    assert_eq!(prompt.read("> ", ()).unwrap(), line("Yes"));
    assert_eq!(prompt.read("> ", ()).unwrap(), line("wip"));

    let entries = history.borrow().entries().to_vec();
    assert_eq!(entries, vec!["Good", "Yes", "Yes", "wip"]);
}

#[test]
fn test_history_up_twice_reaches_oldest() {
    let mut seeded = FileHistory::in_memory();
    ttyprompt::HistoryProvider::push(&mut seeded, "Good");
    ttyprompt::HistoryProvider::push(&mut seeded, "Yes");
    let history = Rc::new(RefCell::new(seeded));
    let term = ScriptedTerminal::new(40, 5).chunk(UP).chunk(UP).keys(b"\r");
    let (answer, term) = read(term, PromptOptions::new().history(history));
    assert_eq!(answer, line("Good"));
    assert_eq!(get_row(&screen(&term), 0), "> Good");
}

#[test]
fn test_masked_input_is_not_recorded() {
    let history = Rc::new(RefCell::new(FileHistory::in_memory()));
    let options = PromptOptions::new().history(history.clone());
    let term = ScriptedTerminal::new(40, 5).typed("pw\r").typed("name\r");
    let prompt = Prompt::with_terminal(term, options).unwrap();
    assert_eq!(prompt.hide("secret: ").unwrap().as_deref(), Some("pw"));
    assert_eq!(prompt.ask("name: ").unwrap().as_deref(), Some("name"));
    assert_eq!(history.borrow().entries(), &["name".to_string()]);
}

#[test]
fn test_history_saved_through_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history");
    let term = ScriptedTerminal::new(40, 5).typed("first\r");
    let options = PromptOptions::new().history_provider(FileHistory::open(&path, 10).unwrap());
    let prompt = Prompt::with_terminal(term, options).unwrap();
    assert_eq!(prompt.ask("> ").unwrap().as_deref(), Some("first"));
    prompt.history().unwrap().borrow_mut().save().unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\n");
}

proptest! {
    #[test]
    fn test_clean_typing_round_trips(text in "[a-zA-Z0-9 .,:;!?-]{1,40}") {
        let term = ScriptedTerminal::new(16, 8).typed(&text).keys(b"\r");
        let (answer, _) = read(term, PromptOptions::new());
        prop_assert_eq!(answer, Answer::Line(text));
    }
}
