use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::error::{Result, ScrollError};
use crate::event::Event;
use crate::pagination::Pagination;
use crate::source::Source;
use crate::types::{Item, PageRequest};

/// Rows taken by the header, status bar and list borders.
const CHROME_ROWS: u16 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Goto(String),
}

pub struct App {
    pub items: Vec<Item>,
    pub pagination: Pagination,
    pub selected: usize,
    /// First visible row of the list.
    pub offset: usize,
    pub viewport_rows: usize,
    pub mode: InputMode,
    pub autoscroll: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub should_quit: bool,
    load_id: u64,
    source: Arc<dyn Source>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        source: Arc<dyn Source>,
        page_size: u32,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::new(page_size),
            selected: 0,
            offset: 0,
            viewport_rows: 1,
            mode: InputMode::Normal,
            autoscroll: false,
            error: None,
            notice: None,
            should_quit: false,
            load_id: 0,
            source,
            action_tx,
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn loading(&self) -> bool {
        self.pagination.is_loading()
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.items.get(self.selected)
    }

    /// The viewport shows the last loaded row.
    pub fn at_bottom(&self) -> bool {
        self.offset + self.viewport_rows >= self.items.len()
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::LoadInitial,
            Event::Tick if self.autoscroll => Action::AutoscrollTick,
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(rows) => Action::Resize(rows),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if let InputMode::Goto(_) = self.mode {
            return match key.code {
                KeyCode::Esc => Action::ExitGotoMode,
                KeyCode::Enter => Action::GotoConfirm,
                KeyCode::Backspace => Action::GotoBackspace,
                KeyCode::Char(c) if c.is_ascii_digit() => Action::GotoInput(c),
                _ => Action::None,
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('d') if ctrl => Action::PageDown,
            KeyCode::Char('u') if ctrl => Action::PageUp,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Char(']') => Action::NextPage,
            KeyCode::Char('[') => Action::PreviousPage,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char(' ') => Action::ToggleAutoscroll,
            KeyCode::Char(':') => Action::EnterGotoMode,
            KeyCode::Enter | KeyCode::Char('o') => Action::OpenInBrowser,
            KeyCode::Char('y') => Action::YankUrl,
            _ => Action::None,
        }
    }

    fn handle_mouse(&self, mouse: MouseEvent) -> Action {
        match mouse.kind {
            MouseEventKind::ScrollDown => Action::ScrollDown,
            MouseEventKind::ScrollUp => Action::ScrollUp,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if !matches!(
            action,
            Action::PageLoaded { .. }
                | Action::AutoscrollTick
                | Action::Resize(_)
                | Action::None
        ) {
            self.error = None;
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::ScrollUp => self.scroll_by(-1),
            Action::ScrollDown => self.scroll_by(1),
            Action::AutoscrollTick => self.autoscroll_step(),
            Action::PageUp => self.scroll_by(-(self.viewport_rows as isize)),
            Action::PageDown => self.scroll_by(self.viewport_rows as isize),
            Action::GoToTop => self.scroll_to(0),
            Action::GoToBottom => self.scroll_to(self.items.len().saturating_sub(1)),
            Action::Resize(h) => {
                self.viewport_rows = h.saturating_sub(CHROME_ROWS).max(1) as usize;
                self.follow_selection();
            }

            Action::LoadInitial => {
                let request = self.pagination.restart();
                self.spawn_load_page(request);
            }
            Action::Refresh => {
                self.items.clear();
                self.selected = 0;
                self.offset = 0;
                let request = self.pagination.restart();
                self.spawn_load_page(request);
            }
            Action::NextPage => {
                if self.pagination.can_scroll() {
                    let request = self.pagination.next_page();
                    self.spawn_load_page(request);
                }
            }
            Action::PreviousPage => {
                if self.pagination.can_scroll() {
                    let request = self.pagination.previous_page();
                    self.spawn_load_page(request);
                }
            }
            Action::PageLoaded {
                request,
                result,
                load_id,
            } => {
                if load_id != self.load_id {
                    tracing::debug!(page = request.page, load_id, "dropping stale page");
                    return;
                }
                match &result.error {
                    Some(error) => {
                        tracing::warn!(page = request.page, %error, "page load failed");
                        self.error = Some(format!("Page {}: {}", request.page + 1, error));
                        self.autoscroll = false;
                    }
                    None => {
                        tracing::info!(
                            page = request.page,
                            offset = result.offset,
                            limit = result.limit,
                            count = result.items.len(),
                            total = result.total,
                            "page loaded"
                        );
                        self.items.extend(result.items.iter().cloned());
                    }
                }
                self.pagination.finish(&result);
            }

            Action::ToggleAutoscroll => {
                self.autoscroll = !self.autoscroll;
            }

            Action::EnterGotoMode => {
                self.mode = InputMode::Goto(String::new());
            }
            Action::ExitGotoMode => {
                self.mode = InputMode::Normal;
            }
            Action::GotoInput(c) => {
                if let InputMode::Goto(input) = &mut self.mode {
                    input.push(c);
                }
            }
            Action::GotoBackspace => {
                if let InputMode::Goto(input) = &mut self.mode {
                    input.pop();
                }
            }
            Action::GotoConfirm => {
                let mode = std::mem::take(&mut self.mode);
                if let InputMode::Goto(input) = mode {
                    if let Ok(number) = input.parse::<usize>() {
                        self.goto_item(number);
                    }
                }
            }

            Action::OpenInBrowser => {
                if let Err(e) = self.open_selected() {
                    self.error = Some(e.to_string());
                }
            }
            Action::YankUrl => match self.yank_selected() {
                Ok(Some(url)) => self.notice = Some(format!("Copied {}", url)),
                Ok(None) => {}
                Err(e) => self.error = Some(e.to_string()),
            },

            Action::None => {}
        }
    }

    /// Select item by 1-based number, clamped to what is loaded.
    fn goto_item(&mut self, number: usize) {
        if self.items.is_empty() {
            return;
        }
        if number > self.items.len() {
            self.notice = Some(format!(
                "Only {} items loaded, showing the last one",
                self.items.len()
            ));
        }
        self.scroll_to(number.clamp(1, self.items.len()) - 1);
    }

    /// Autoscroll walks like `ScrollDown` until the last page is in, then
    /// stops on the last row instead of re-fetching the clamped page.
    fn autoscroll_step(&mut self) {
        if !self.pagination.at_end() {
            self.scroll_by(1);
            return;
        }
        if self.selected + 1 >= self.items.len() {
            self.autoscroll = false;
            self.notice = Some("Reached the end of the list".to_string());
            return;
        }
        self.selected += 1;
        self.follow_selection();
    }

    fn scroll_by(&mut self, delta: isize) {
        let target = self.selected as isize + delta;
        self.scroll_to(target.max(0) as usize);
    }

    /// Move the selection, then run the scroll hook.
    fn scroll_to(&mut self, index: usize) {
        self.selected = index;
        self.follow_selection();

        if let Some(request) = self.pagination.on_scroll(self.at_bottom()) {
            self.spawn_load_page(request);
        }
    }

    /// Clamp the selection and keep it inside the viewport.
    fn follow_selection(&mut self) {
        if self.items.is_empty() {
            self.selected = 0;
            self.offset = 0;
            return;
        }
        self.selected = self.selected.min(self.items.len() - 1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + self.viewport_rows {
            self.offset = self.selected + 1 - self.viewport_rows;
        }
    }

    fn spawn_load_page(&mut self, request: PageRequest) {
        self.load_id += 1;
        let load_id = self.load_id;
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tracing::debug!(page = request.page, offset = request.offset, load_id, "loading page");
        tokio::spawn(async move {
            let result = source.fetch_page(&request).await;
            tx.send(Action::PageLoaded {
                request,
                result,
                load_id,
            })
            .ok();
        });
    }

    fn open_selected(&self) -> Result<()> {
        if let Some(item) = self.selected_item() {
            open::that_detached(&item.url)?;
        }
        Ok(())
    }

    fn yank_selected(&self) -> Result<Option<String>> {
        let Some(item) = self.selected_item() else {
            return Ok(None);
        };
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ScrollError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(item.url.clone())
            .map_err(|e| ScrollError::Clipboard(e.to_string()))?;
        Ok(Some(item.url.clone()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::types::PageResult;

    #[derive(Debug)]
    pub(crate) struct FakeSource {
        total: u32,
        fail_with: Option<String>,
        pub requests: Mutex<Vec<PageRequest>>,
    }

    impl FakeSource {
        pub fn new(total: u32) -> Self {
            Self {
                total,
                fail_with: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: &str) -> Self {
            Self {
                fail_with: Some(error.to_string()),
                ..Self::new(0)
            }
        }

        fn pages(&self) -> Vec<u32> {
            self.requests.lock().unwrap().iter().map(|r| r.page).collect()
        }
    }

    pub(crate) fn mon(n: u32) -> Item {
        Item {
            name: format!("mon-{}", n),
            url: format!("https://pokeapi.co/api/v2/pokemon/{}/", n + 1),
        }
    }

    #[async_trait]
    impl Source for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch_page(&self, request: &PageRequest) -> PageResult {
            self.requests.lock().unwrap().push(*request);
            if let Some(error) = &self.fail_with {
                return PageResult::failed(request, error.clone());
            }
            let end = (request.offset + request.limit).min(self.total);
            PageResult {
                items: (request.offset..end).map(mon).collect(),
                total: self.total,
                offset: request.offset,
                limit: request.limit,
                error: None,
            }
        }
    }

    fn new_app(
        source: Arc<FakeSource>,
        page_size: u32,
        height: u16,
    ) -> (App, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut app = App::new(source, page_size, tx);
        app.update(Action::Resize(height));
        (app, rx)
    }

    /// Deliver the next finished fetch back into the app.
    async fn settle(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Action>) {
        let action = rx.recv().await.unwrap();
        assert!(matches!(action, Action::PageLoaded { .. }));
        app.update(action);
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn initial_load_appends_first_page() {
        let source = Arc::new(FakeSource::new(1302));
        let (mut app, mut rx) = new_app(source.clone(), 10, 24);

        app.update(Action::LoadInitial);
        assert!(app.loading());
        settle(&mut app, &mut rx).await;

        assert_eq!(app.items.len(), 10);
        assert_eq!(app.items[0].name, "mon-0");
        assert_eq!(app.pagination.total_pages, 130);
        assert!(app.pagination.can_scroll());
        assert_eq!(source.pages(), vec![0]);
    }

    #[tokio::test]
    async fn reaching_bottom_loads_next_page_once() {
        let source = Arc::new(FakeSource::new(1302));
        // 9 rows tall leaves 5 list rows.
        let (mut app, mut rx) = new_app(source.clone(), 10, 9);
        app.update(Action::LoadInitial);
        settle(&mut app, &mut rx).await;

        for _ in 0..8 {
            app.update(Action::ScrollDown);
        }
        assert!(!app.at_bottom());
        assert_eq!(app.load_id, 1);

        app.update(Action::ScrollDown);
        assert!(app.at_bottom());
        assert_eq!(app.load_id, 2);
        assert!(app.loading());

        // Still at the bottom, but a page is in flight.
        app.update(Action::ScrollDown);
        app.update(Action::GoToBottom);
        assert_eq!(app.load_id, 2);

        settle(&mut app, &mut rx).await;
        assert_eq!(app.items.len(), 20);
        assert_eq!(app.items[10].name, "mon-10");
        assert_eq!(app.pagination.current_page, 1);
        assert_eq!(source.pages(), vec![0, 1]);
    }

    #[tokio::test]
    async fn scroll_above_bottom_does_not_fetch() {
        let source = Arc::new(FakeSource::new(1302));
        let (mut app, mut rx) = new_app(source.clone(), 50, 24);
        app.update(Action::LoadInitial);
        settle(&mut app, &mut rx).await;

        app.update(Action::ScrollDown);
        app.update(Action::ScrollUp);
        app.update(Action::PageDown);

        assert_eq!(app.load_id, 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn http_error_appends_nothing_and_unlocks() {
        let source = Arc::new(FakeSource::failing("404 - Not Found"));
        let (mut app, mut rx) = new_app(source.clone(), 10, 24);
        app.autoscroll = true;

        app.update(Action::LoadInitial);
        settle(&mut app, &mut rx).await;

        assert!(app.items.is_empty());
        assert_eq!(app.error.as_deref(), Some("Page 1: 404 - Not Found"));
        assert!(app.pagination.can_scroll());
        assert!(!app.autoscroll);
    }

    #[tokio::test]
    async fn previous_page_at_zero_refetches_zero() {
        let source = Arc::new(FakeSource::new(1302));
        let (mut app, mut rx) = new_app(source.clone(), 10, 24);
        app.update(Action::LoadInitial);
        settle(&mut app, &mut rx).await;

        app.update(Action::PreviousPage);
        settle(&mut app, &mut rx).await;

        assert_eq!(app.pagination.current_page, 0);
        assert_eq!(source.pages(), vec![0, 0]);
        // No deduplication: page 0 is appended twice.
        assert_eq!(app.items.len(), 20);
    }

    #[tokio::test]
    async fn explicit_next_page_is_gated_while_loading() {
        let source = Arc::new(FakeSource::new(1302));
        let (mut app, mut rx) = new_app(source.clone(), 10, 24);
        app.update(Action::LoadInitial);
        app.update(Action::NextPage);
        assert_eq!(app.load_id, 1);

        settle(&mut app, &mut rx).await;
        app.update(Action::NextPage);
        settle(&mut app, &mut rx).await;
        assert_eq!(source.pages(), vec![0, 1]);
    }

    #[tokio::test]
    async fn refresh_drops_stale_results() {
        let source = Arc::new(FakeSource::new(1302));
        let (mut app, mut rx) = new_app(source.clone(), 10, 24);
        app.update(Action::LoadInitial);
        app.update(Action::Refresh);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        app.update(first);
        app.update(second);

        assert_eq!(app.items.len(), 10);
        assert_eq!(app.load_id, 2);
    }

    #[tokio::test]
    async fn autoscroll_stops_at_end_of_collection() {
        let source = Arc::new(FakeSource::new(25));
        let (mut app, mut rx) = new_app(source.clone(), 10, 9);
        app.update(Action::LoadInitial);
        settle(&mut app, &mut rx).await;
        app.update(Action::ToggleAutoscroll);

        for _ in 0..200 {
            let action = app.handle_event(Event::Tick);
            app.update(action);
            if app.loading() {
                settle(&mut app, &mut rx).await;
            }
        }

        assert_eq!(source.pages(), vec![0, 1, 2]);
        assert_eq!(app.items.len(), 25);
        assert_eq!(app.selected, 24);
        assert!(!app.autoscroll);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn manual_scroll_at_end_still_refetches_last_page() {
        let source = Arc::new(FakeSource::new(25));
        let (mut app, mut rx) = new_app(source.clone(), 10, 40);
        app.update(Action::LoadInitial);
        settle(&mut app, &mut rx).await;
        for _ in 0..2 {
            app.update(Action::ScrollDown);
            settle(&mut app, &mut rx).await;
        }
        assert!(app.pagination.at_end());

        app.update(Action::ScrollDown);
        settle(&mut app, &mut rx).await;
        assert_eq!(source.pages(), vec![0, 1, 2, 2]);
    }

    #[tokio::test]
    async fn resize_keeps_fetch_error_visible() {
        let source = Arc::new(FakeSource::failing("404 - Not Found"));
        let (mut app, mut rx) = new_app(source.clone(), 10, 24);
        app.update(Action::LoadInitial);
        settle(&mut app, &mut rx).await;

        let action = app.handle_event(Event::Resize(30));
        app.update(action);

        assert_eq!(app.viewport_rows, 26);
        assert_eq!(app.error.as_deref(), Some("Page 1: 404 - Not Found"));

        app.update(Action::ScrollDown);
        assert!(app.error.is_none());
    }

    #[tokio::test]
    async fn goto_selects_item_by_number() {
        let source = Arc::new(FakeSource::new(1302));
        let (mut app, mut rx) = new_app(source.clone(), 50, 24);
        app.update(Action::LoadInitial);
        settle(&mut app, &mut rx).await;

        for event in [
            key(KeyCode::Char(':')),
            key(KeyCode::Char('1')),
            key(KeyCode::Char('x')),
            key(KeyCode::Char('5')),
            key(KeyCode::Enter),
        ] {
            let action = app.handle_event(event);
            app.update(action);
        }

        assert_eq!(app.mode, InputMode::Normal);
        assert_eq!(app.selected, 14);
        assert_eq!(app.selected_item().unwrap().name, "mon-14");
    }

    #[tokio::test]
    async fn goto_past_loaded_clamps_to_last() {
        let source = Arc::new(FakeSource::new(1302));
        let (mut app, mut rx) = new_app(source.clone(), 10, 24);
        app.update(Action::LoadInitial);
        settle(&mut app, &mut rx).await;

        app.update(Action::EnterGotoMode);
        app.update(Action::GotoInput('9'));
        app.update(Action::GotoInput('9'));
        app.update(Action::GotoConfirm);

        assert_eq!(app.selected, 9);
        assert!(app.notice.is_some());
    }

    #[test]
    fn tick_scrolls_only_when_autoscroll_is_on() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(Arc::new(FakeSource::new(0)), 10, tx);
        assert!(matches!(app.handle_event(Event::Tick), Action::None));

        app.update(Action::ToggleAutoscroll);
        assert!(matches!(app.handle_event(Event::Tick), Action::AutoscrollTick));
    }

    #[test]
    fn key_bindings() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let app = App::new(Arc::new(FakeSource::new(0)), 10, tx);
        assert!(matches!(app.handle_event(key(KeyCode::Char('j'))), Action::ScrollDown));
        assert!(matches!(app.handle_event(key(KeyCode::Up)), Action::ScrollUp));
        assert!(matches!(app.handle_event(key(KeyCode::Char('G'))), Action::GoToBottom));
        assert!(matches!(app.handle_event(key(KeyCode::Char(']'))), Action::NextPage));
        assert!(matches!(app.handle_event(key(KeyCode::Char('['))), Action::PreviousPage));
        assert!(matches!(app.handle_event(key(KeyCode::Char('q'))), Action::Quit));
        assert!(matches!(app.handle_event(Event::Init), Action::LoadInitial));
        assert!(matches!(
            app.handle_event(Event::Key(KeyEvent::new(
                KeyCode::Char('d'),
                KeyModifiers::CONTROL
            ))),
            Action::PageDown
        ));
    }
}
