//! Menus built from labelled actions, plus the two stock dialogs.

use super::navigation::NavigationController;
use super::render::Render;
use anyhow::Result;

/// What the menu loop does after an action returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuFlow {
    /// Show the menu again.
    Continue,
    /// Leave the menu.
    Exit,
}

type Action<'a> = Box<dyn FnMut() -> Result<MenuFlow> + 'a>;

/// One selectable entry.
pub struct MenuItem<'a> {
    pub label: String,
    action: Action<'a>,
}

impl<'a> MenuItem<'a> {
    pub fn new<F>(label: impl Into<String>, action: F) -> Self
    where
        F: FnMut() -> Result<MenuFlow> + 'a,
    {
        Self {
            label: label.into(),
            action: Box::new(action),
        }
    }

    pub fn activate(&mut self) -> Result<MenuFlow> {
        (self.action)()
    }
}

impl std::fmt::Debug for MenuItem<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuItem")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A titled list of items shown until one of them exits.
///
/// Cancelling the menu (Ctrl+C, end of input) activates the last item, so
/// menus should end with a Back or Exit entry; [`Menu::back`] adds one.
#[derive(Debug)]
pub struct Menu<'a> {
    title: String,
    items: Vec<MenuItem<'a>>,
}

impl<'a> Menu<'a> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn item<F>(mut self, label: impl Into<String>, action: F) -> Self
    where
        F: FnMut() -> Result<MenuFlow> + 'a,
    {
        self.items.push(MenuItem::new(label, action));
        self
    }

    /// Append an item that leaves the menu.
    pub fn back(self, label: impl Into<String>) -> Self {
        self.item(label, || Ok(MenuFlow::Exit))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.label.as_str()).collect()
    }

    /// Show the menu and run chosen actions until one returns
    /// [`MenuFlow::Exit`].
    ///
    /// A failing action is logged and reported on stderr; the menu is shown
    /// again afterwards.
    ///
    /// # Errors
    ///
    /// Propagates navigation failures (no items, closed output, dead input).
    pub fn run<R: Render>(&mut self, controller: &mut NavigationController<R>) -> Result<()> {
        loop {
            let selection = {
                let labels = self.labels();
                controller.run(&self.title, &labels)?
            };
            let item = &mut self.items[selection.index];
            log::info!("menu '{}': running '{}'", self.title, item.label);

            match item.activate() {
                Ok(MenuFlow::Exit) => return Ok(()),
                Ok(MenuFlow::Continue) => {}
                Err(e) => {
                    log::error!("menu '{}': '{}' failed: {e:#}", self.title, item.label);
                    eprintln!("Error: {e:#}");
                }
            }
        }
    }
}

/// Pick one of `options`; a trailing `Cancel` entry is added.
///
/// Returns the 0-based option index, or `None` when cancelled.
///
/// # Errors
///
/// Propagates navigation failures.
pub fn select_option<R: Render>(
    controller: &mut NavigationController<R>,
    title: &str,
    options: &[&str],
) -> Result<Option<usize>> {
    let mut labels = options.to_vec();
    labels.push("Cancel");
    let selection = controller.run(title, &labels)?;
    Ok((selection.index < options.len()).then_some(selection.index))
}

/// Ask a yes/no question; cancelling answers no.
///
/// # Errors
///
/// Propagates navigation failures.
pub fn confirm<R: Render>(controller: &mut NavigationController<R>, title: &str) -> Result<bool> {
    let selection = controller.run(title, &["Yes", "No"])?;
    Ok(selection.index == 0)
}
