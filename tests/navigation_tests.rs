//! Navigation controller tests
//!
//! Drives whole menu invocations with scripted keys and lines, recording
//! what the controller asks the renderer to draw.

use magic_menu::menu::input::{PosixKeyReader, RawModeControl};
use magic_menu::menu::{
    Frame, Input, InterruptFlag, KeyEvent, KeyReader, LineSource, NavigationController, Redraw,
    Render, ScriptedKeys, ScriptedLines, SelectionState, TerminalInfo,
};
use std::io::{self, Cursor};
use std::time::Duration;

/// One call the controller made on the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Render {
        redraw: Redraw,
        selection: SelectionState,
        key_navigation: bool,
    },
    Hide,
    Show,
    Message(String),
}

/// Renderer that only records calls.
#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl Render for Recorder {
    fn render(&mut self, frame: &Frame<'_>, redraw: Redraw) {
        self.calls.push(Call::Render {
            redraw,
            selection: frame.selection,
            key_navigation: frame.key_navigation,
        });
    }

    fn hide_cursor(&mut self) {
        self.calls.push(Call::Hide);
    }

    fn show_cursor(&mut self) {
        self.calls.push(Call::Show);
    }

    fn message(&mut self, text: &str) {
        self.calls.push(Call::Message(text.to_string()));
    }
}

impl Recorder {
    fn renders(&self) -> Vec<(Redraw, SelectionState)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Render {
                    redraw, selection, ..
                } => Some((*redraw, *selection)),
                _ => None,
            })
            .collect()
    }

    fn count(&self, wanted: &Call) -> usize {
        self.calls.iter().filter(|call| *call == wanted).count()
    }

    fn messages(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Message(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn labels(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("Item {n}")).collect()
}

fn keys_controller(
    columns: u16,
    rows: u16,
    keys: ScriptedKeys,
) -> NavigationController<Recorder> {
    NavigationController::new(
        Recorder::default(),
        TerminalInfo::fixed(columns, rows),
        Input::Keys(Box::new(keys)),
    )
    .with_debounce(Duration::ZERO)
}

fn lines_controller(lines: &[&str]) -> NavigationController<Recorder> {
    NavigationController::new(
        Recorder::default(),
        TerminalInfo::fixed(80, 24),
        Input::Lines(Box::new(ScriptedLines::new(lines.iter().copied()))),
    )
}

fn run(nav: &mut NavigationController<Recorder>, count: usize) -> anyhow::Result<usize> {
    let owned = labels(count);
    let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
    nav.choose("Test Menu", &refs)
}

#[test]
fn test_arrow_down_twice_then_enter_picks_third() {
    let keys = ScriptedKeys::new([KeyEvent::Down, KeyEvent::Down, KeyEvent::Enter]);
    let mut nav = keys_controller(80, 24, keys);

    assert_eq!(run(&mut nav, 9).expect("choose"), 3);

    let renders = nav.renderer().renders();
    assert_eq!(renders.len(), 3);
    assert_eq!(renders[0].0, Redraw::Full);
    assert_eq!(renders[1].0, Redraw::Partial { previous: 0 });
    assert_eq!(renders[2].0, Redraw::Partial { previous: 1 });
    assert!(renders.iter().all(|(_, sel)| sel.scroll_offset == 0));
}

#[test]
fn test_scrolling_forces_full_redraw() {
    // 15 rows leave 7 item rows.
    let mut keys = ScriptedKeys::new(std::iter::repeat(KeyEvent::Down).take(7));
    keys.push(KeyEvent::Enter);
    let mut nav = keys_controller(80, 15, keys);

    assert_eq!(run(&mut nav, 30).expect("choose"), 8);

    let renders = nav.renderer().renders();
    assert_eq!(renders.len(), 8);
    for (redraw, _) in &renders[1..7] {
        assert!(matches!(redraw, Redraw::Partial { .. }));
    }
    let (redraw, selection) = renders[7];
    assert_eq!(redraw, Redraw::Full);
    assert_eq!(
        selection,
        SelectionState {
            selected: 7,
            scroll_offset: 1
        }
    );
}

#[test]
fn test_up_from_top_wraps_and_scrolls_to_end() {
    let keys = ScriptedKeys::new([KeyEvent::Up, KeyEvent::Enter]);
    let mut nav = keys_controller(80, 15, keys);

    assert_eq!(run(&mut nav, 30).expect("choose"), 30);

    let renders = nav.renderer().renders();
    let (redraw, selection) = renders[1];
    assert_eq!(redraw, Redraw::Full);
    assert_eq!(selection.scroll_offset, 23);
}

#[test]
fn test_digit_selects_immediately() {
    let keys = ScriptedKeys::new([KeyEvent::Digit(5)]);
    let mut nav = keys_controller(80, 24, keys);

    assert_eq!(run(&mut nav, 10).expect("choose"), 5);
    assert_eq!(nav.renderer().renders().len(), 1);
}

#[test]
fn test_out_of_range_digits_and_other_keys_are_ignored() {
    let keys = ScriptedKeys::new([
        KeyEvent::Digit(0),
        KeyEvent::Digit(9),
        KeyEvent::Other,
        KeyEvent::Digit(2),
    ]);
    let mut nav = keys_controller(80, 24, keys);

    assert_eq!(run(&mut nav, 3).expect("choose"), 2);
    assert_eq!(nav.renderer().renders().len(), 1);
}

#[test]
fn test_interrupt_returns_last_item_and_restores_cursor() {
    let keys = ScriptedKeys::new([KeyEvent::Down, KeyEvent::Interrupt]);
    let mut nav = keys_controller(80, 24, keys);

    let owned = labels(6);
    let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
    let selection = nav.run("Test Menu", &refs).expect("run");
    assert!(selection.cancelled);
    assert_eq!(selection.ordinal(), 6);

    let recorder = nav.renderer();
    assert_eq!(recorder.count(&Call::Hide), 1);
    assert_eq!(recorder.count(&Call::Show), 1);
    assert_eq!(recorder.calls.last(), Some(&Call::Show));
}

#[test]
fn test_exhausted_input_cancels() {
    let mut nav = keys_controller(80, 24, ScriptedKeys::default());
    assert_eq!(run(&mut nav, 4).expect("choose"), 4);
}

#[test]
fn test_empty_menu_is_an_error() {
    let mut nav = keys_controller(80, 24, ScriptedKeys::default());
    let err = nav.choose("Nothing", &[]).expect_err("empty menu");
    assert!(err.to_string().contains("no items"));
    assert!(nav.renderer().calls.is_empty());
}

#[test]
fn test_transient_read_errors_are_skipped() {
    let mut keys = ScriptedKeys::default();
    for _ in 0..15 {
        keys.push_error(io::ErrorKind::Other);
    }
    keys.push(KeyEvent::Down);
    keys.push(KeyEvent::Enter);
    let mut nav = keys_controller(80, 24, keys);

    assert_eq!(run(&mut nav, 3).expect("choose"), 2);
}

#[test]
fn test_persistent_read_errors_fail_and_restore_cursor() {
    let mut keys = ScriptedKeys::default();
    for _ in 0..16 {
        keys.push_error(io::ErrorKind::Other);
    }
    let mut nav = keys_controller(80, 24, keys);

    assert!(run(&mut nav, 3).is_err());
    assert_eq!(nav.renderer().count(&Call::Show), 1);
}

#[test]
fn test_repeated_key_inside_window_is_dropped() {
    let keys = ScriptedKeys::new([KeyEvent::Down, KeyEvent::Down, KeyEvent::Enter]);
    let mut nav = NavigationController::new(
        Recorder::default(),
        TerminalInfo::fixed(80, 24),
        Input::Keys(Box::new(keys)),
    )
    .with_debounce(Duration::from_secs(60));

    assert_eq!(run(&mut nav, 5).expect("choose"), 2);
}

#[test]
fn test_line_input_retries_until_valid() {
    let mut nav = lines_controller(&["abc\n", "42\n", " 3 \n"]);

    assert_eq!(run(&mut nav, 5).expect("choose"), 3);

    let recorder = nav.renderer();
    assert_eq!(
        recorder.messages(),
        vec![
            "\nEnter your choice: ",
            "Please enter a valid number\n",
            "\nEnter your choice: ",
            "Please enter a number between 1 and 5\n",
            "\nEnter your choice: ",
        ]
    );
    assert_eq!(recorder.count(&Call::Hide), 0);
    match &recorder.calls[0] {
        Call::Render { key_navigation, .. } => assert!(!key_navigation),
        other => panic!("expected a render first, got {other:?}"),
    }
}

#[test]
fn test_line_input_end_of_input_cancels() {
    let mut nav = lines_controller(&["0\n"]);

    let owned = labels(4);
    let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
    let selection = nav.run("Test Menu", &refs).expect("run");
    assert!(selection.cancelled);
    assert_eq!(selection.ordinal(), 4);
}

#[test]
fn test_down_through_nine_items_wraps_to_first() {
    let mut keys = ScriptedKeys::new(std::iter::repeat(KeyEvent::Down).take(8));
    keys.push(KeyEvent::Enter);
    let mut nav = keys_controller(80, 24, keys);
    assert_eq!(run(&mut nav, 9).expect("choose"), 9);

    let mut keys = ScriptedKeys::new(std::iter::repeat(KeyEvent::Down).take(9));
    keys.push(KeyEvent::Enter);
    let mut nav = keys_controller(80, 24, keys);
    assert_eq!(run(&mut nav, 9).expect("choose"), 1);
}

#[test]
fn test_selection_stays_inside_scroll_window() {
    // Pseudo-random walk over several list sizes; every drawn frame must
    // keep the selection inside the window.
    let pattern = [
        KeyEvent::Down,
        KeyEvent::Down,
        KeyEvent::Up,
        KeyEvent::Down,
        KeyEvent::Up,
        KeyEvent::Up,
        KeyEvent::Up,
        KeyEvent::Down,
    ];
    for count in [1, 2, 7, 8, 13, 30] {
        let mut keys = ScriptedKeys::default();
        for step in 0..120 {
            keys.push(pattern[(step * 5 + count) % pattern.len()]);
        }
        keys.push(KeyEvent::Enter);
        let mut nav = keys_controller(80, 15, keys);
        run(&mut nav, count).expect("choose");

        for (_, selection) in nav.renderer().renders() {
            assert!(selection.selected < count);
            if count > 7 {
                assert!(selection.scroll_offset <= selection.selected);
                assert!(selection.selected < selection.scroll_offset + 7);
            } else {
                assert_eq!(selection.scroll_offset, 0);
            }
        }
    }
}

#[test]
fn test_digit_ignores_prior_navigation() {
    let keys = ScriptedKeys::new([KeyEvent::Up, KeyEvent::Up, KeyEvent::Down, KeyEvent::Digit(5)]);
    let mut nav = keys_controller(80, 24, keys);
    assert_eq!(run(&mut nav, 10).expect("choose"), 5);
}

/// Leaves the terminal alone.
struct NoRawMode;

impl RawModeControl for NoRawMode {
    fn enable(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn disable(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_function_key_bytes_do_not_select_items() {
    // F5 (`ESC [ 1 5 ~`), Down, Enter.
    let reader = PosixKeyReader::new(Cursor::new(b"\x1b[15~\x1b[B\r".to_vec()), NoRawMode);
    let mut nav = NavigationController::new(
        Recorder::default(),
        TerminalInfo::fixed(80, 24),
        Input::Keys(Box::new(reader)),
    )
    .with_debounce(Duration::ZERO);

    assert_eq!(run(&mut nav, 9).expect("choose"), 2);
}

#[test]
fn test_modified_arrow_moves_once() {
    // Shift+Down (`ESC [ 1 ; 2 B`), Enter.
    let reader = PosixKeyReader::new(Cursor::new(b"\x1b[1;2B\r".to_vec()), NoRawMode);
    let mut nav = NavigationController::new(
        Recorder::default(),
        TerminalInfo::fixed(80, 24),
        Input::Keys(Box::new(reader)),
    )
    .with_debounce(Duration::ZERO);

    assert_eq!(run(&mut nav, 9).expect("choose"), 2);
}

/// Raises the flag while "blocked" in a read, like SIGINT would.
struct InterruptedRead {
    flag: InterruptFlag,
}

impl KeyReader for InterruptedRead {
    fn read_key(&mut self) -> io::Result<KeyEvent> {
        self.flag.raise();
        Err(io::Error::from(io::ErrorKind::Interrupted))
    }
}

impl LineSource for InterruptedRead {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.flag.raise();
        Ok(Some(String::new()))
    }
}

#[test]
fn test_ctrl_c_during_line_read_cancels() {
    let flag = InterruptFlag::new();
    let source = InterruptedRead { flag: flag.clone() };
    let mut nav = NavigationController::new(
        Recorder::default(),
        TerminalInfo::fixed(80, 24),
        Input::Lines(Box::new(source)),
    )
    .with_interrupts(flag.clone());

    let owned = labels(5);
    let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
    let selection = nav.run("Test Menu", &refs).expect("run");
    assert!(selection.cancelled);
    assert_eq!(selection.ordinal(), 5);
    assert!(!flag.is_raised());
    assert_eq!(
        nav.renderer().messages(),
        vec!["\nEnter your choice: ", "\n"]
    );
}

#[test]
fn test_ctrl_c_during_key_read_cancels_and_restores_cursor() {
    let flag = InterruptFlag::new();
    let reader = InterruptedRead { flag: flag.clone() };
    let mut nav = NavigationController::new(
        Recorder::default(),
        TerminalInfo::fixed(80, 24),
        Input::Keys(Box::new(reader)),
    )
    .with_interrupts(flag.clone());

    let owned = labels(3);
    let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
    let selection = nav.run("Test Menu", &refs).expect("run");
    assert!(selection.cancelled);
    assert_eq!(selection.ordinal(), 3);

    let recorder = nav.renderer();
    assert_eq!(recorder.count(&Call::Hide), 1);
    assert_eq!(recorder.count(&Call::Show), 1);
    assert_eq!(recorder.calls.last(), Some(&Call::Show));
}

#[test]
fn test_pending_ctrl_c_cancels_next_menu_before_reading() {
    let flag = InterruptFlag::new();
    flag.raise();
    let mut nav = keys_controller(80, 24, ScriptedKeys::new([KeyEvent::Enter]))
        .with_interrupts(flag.clone());
    assert_eq!(run(&mut nav, 4).expect("choose"), 4);

    // Consumed: the next menu reads keys normally.
    let mut nav = keys_controller(80, 24, ScriptedKeys::new([KeyEvent::Enter]))
        .with_interrupts(flag);
    assert_eq!(run(&mut nav, 4).expect("choose"), 1);
}
