//! Per-document state: the text, its syntax settings and the latest scan.
//!
//! A [`DocumentSession`] decides between a full scan and a windowed scan,
//! keeps the result until the next modification, and runs the structural
//! commands against it. Everything takes `&mut self`, so a rescan can never
//! start while a caller still holds the previous snapshot.

use std::ops::Range;
use std::time::Instant;

use crate::config::{Config, SyntaxSettings};
use crate::error::BracketError;
use crate::matcher::{BracketMatcher, ScanResult};
use crate::ops::{EditPlan, RetypeSession, SelectTarget, StructuralOps, apply_edits};
use crate::render::{Marks, Report};
use crate::scope::ScopeClassifier;
use crate::tree::{Candidate, Forest};
use crate::window::{WindowScan, WindowedMatcher};

pub struct DocumentSession {
    settings: SyntaxSettings,
    window_size: usize,
    large_file_threshold: usize,
    text: Vec<char>,
    cursor: usize,
    coloring: bool,
    /// Full scan of the current text; `None` when stale or windowed.
    scan: Option<ScanResult>,
    /// Windowed scan of the current text, used for large documents.
    window: Option<WindowScan>,
    retype: RetypeSession,
    closed: bool,
}

impl DocumentSession {
    pub fn new(settings: SyntaxSettings, config: &Config, text: &str) -> Result<Self, BracketError> {
        // Validates the window size up front rather than on the first large scan.
        WindowedMatcher::new(&settings.table, config.window_size)?;

        Ok(DocumentSession {
            coloring: settings.enabled && settings.coloring,
            settings,
            window_size: config.window_size,
            large_file_threshold: config.large_file_threshold,
            text: text.chars().collect(),
            cursor: 0,
            scan: None,
            window: None,
            retype: RetypeSession::default(),
            closed: false,
        })
    }

    pub fn syntax(&self) -> &str {
        &self.settings.name
    }

    pub fn settings(&self) -> &SyntaxSettings {
        &self.settings
    }

    pub fn chars(&self) -> &[char] {
        &self.text
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_coloring(&self) -> bool {
        self.coloring
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_windowed(&self) -> bool {
        self.coloring && self.text.len() > self.large_file_threshold
    }

    /// Replaces the whole text, as after a modification. The next
    /// [`refresh`](Self::refresh) rescans from scratch.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.chars().collect();
        self.cursor = self.cursor.min(self.text.len());
        self.invalidate();
    }

    /// Moves the cursor. Only windowed scans depend on it.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.text.len());
        if self.window.is_some() {
            self.window = None;
        }
    }

    fn invalidate(&mut self) {
        self.scan = None;
        self.window = None;
    }

    fn ensure_open(&self) -> Result<(), BracketError> {
        if self.closed {
            return Err(BracketError::SessionClosed);
        }
        Ok(())
    }

    fn candidates(&self) -> Vec<Candidate> {
        ScopeClassifier::new(&self.settings.table, &self.settings.rules).candidates(&self.text)
    }

    fn scan_full(&self, colored: bool) -> ScanResult {
        #[cfg(debug_assertions)]
        let start = Instant::now();

        let matcher = BracketMatcher::new(&self.settings.table);
        let candidates = self.candidates();
        let result = if colored {
            matcher.scan_colored(candidates)
        } else {
            matcher.scan(candidates)
        };

        #[cfg(debug_assertions)]
        log::debug!(
            "scanned {} chars ({}): {} pairs, {} mismatched, {:?}",
            self.text.len(),
            self.settings.name,
            result.forest.pair_count(),
            result.mismatches.len(),
            start.elapsed()
        );

        result
    }

    /// Rescans the document if the last scan is stale.
    ///
    /// Large documents that are being colored get a windowed scan around the
    /// cursor; everything else gets a full scan, with level buckets only while
    /// coloring.
    pub fn refresh(&mut self) -> Result<(), BracketError> {
        self.ensure_open()?;

        if self.is_windowed() {
            if self.window.is_none() {
                let matcher = WindowedMatcher::new(&self.settings.table, self.window_size)?;
                self.window = Some(matcher.scan(&self.candidates(), self.cursor));
            }
            return Ok(());
        }

        let stale = match &self.scan {
            None => true,
            Some(scan) => self.coloring && scan.buckets.is_empty() && scan.forest.pair_count() > 0,
        };
        if stale {
            self.scan = Some(self.scan_full(self.coloring));
        }
        Ok(())
    }

    /// Turns coloring on and rescans.
    pub fn color(&mut self) -> Result<(), BracketError> {
        self.ensure_open()?;
        if !self.coloring {
            self.coloring = true;
            self.invalidate();
        }
        self.refresh()
    }

    /// Turns coloring off. The forest stays available for structural commands.
    pub fn sweep(&mut self) {
        self.coloring = false;
        self.window = None;
        if let Some(scan) = &mut self.scan {
            scan.buckets.clear();
        }
    }

    /// Releases the scan state. Further scans and commands fail with
    /// [`BracketError::SessionClosed`].
    pub fn close(&mut self) {
        #[cfg(debug_assertions)]
        log::debug!("closing {} document session", self.settings.name);

        self.sweep();
        self.invalidate();
        self.retype.reset();
        self.closed = true;
    }

    /// Latest full scan, if the document is not in windowed mode.
    pub fn scan(&self) -> Option<&ScanResult> {
        self.scan.as_ref()
    }

    /// Latest windowed scan, if the document is in windowed mode.
    pub fn window_scan(&self) -> Option<&WindowScan> {
        self.window.as_ref()
    }

    /// Marks for the renderer; empty while not coloring.
    pub fn marks(&self) -> Marks {
        if !self.coloring {
            return Marks::default();
        }
        match (&self.window, &self.scan) {
            (Some(window), _) => Marks::from_window(window),
            (None, Some(scan)) => Marks::from_scan(scan),
            (None, None) => Marks::default(),
        }
    }

    pub fn report(&self) -> Option<Report> {
        match (&self.window, &self.scan) {
            (Some(window), _) => Some(Report::from_window(&self.settings.name, window)),
            (None, Some(scan)) => Some(Report::from_scan(&self.settings.name, scan)),
            (None, None) => None,
        }
    }

    fn ensure_scan(&mut self) -> Result<(), BracketError> {
        self.ensure_open()?;
        if self.scan.is_none() {
            self.scan = Some(self.scan_full(false));
        }
        Ok(())
    }

    /// Full forest of the current text, scanning without colors if needed.
    pub fn forest(&mut self) -> Result<&Forest, BracketError> {
        self.ensure_scan()?;
        Ok(&self.scan.get_or_insert_with(ScanResult::default).forest)
    }

    pub fn select(
        &mut self,
        selections: &[Range<usize>],
        target: Option<&SelectTarget>,
    ) -> Result<Vec<Range<usize>>, BracketError> {
        self.ensure_scan()?;
        let forest = &self.scan.get_or_insert_with(ScanResult::default).forest;
        Ok(StructuralOps::new(forest, &self.text).select(selections, target))
    }

    /// Removes the pairs around `selections` and rescans.
    pub fn remove(
        &mut self,
        selections: &[Range<usize>],
        select_content: bool,
    ) -> Result<EditPlan, BracketError> {
        self.ensure_scan()?;
        let forest = &self.scan.get_or_insert_with(ScanResult::default).forest;
        let plan = StructuralOps::new(forest, &self.text).remove(selections, select_content);
        self.apply(&plan)?;
        Ok(plan)
    }

    /// Retypes the pairs around `selections` to `to` and rescans. Repeating
    /// the same retype within the session window steps one pair outward.
    pub fn retype(
        &mut self,
        selections: &[Range<usize>],
        to: char,
        now: Instant,
    ) -> Result<EditPlan, BracketError> {
        self.ensure_scan()?;
        let forest = &self.scan.get_or_insert_with(ScanResult::default).forest;
        let plan = StructuralOps::new(forest, &self.text).transform(
            &self.settings.table,
            selections,
            to,
            &mut self.retype,
            now,
        )?;
        self.apply(&plan)?;
        Ok(plan)
    }

    fn apply(&mut self, plan: &EditPlan) -> Result<(), BracketError> {
        if plan.is_empty() {
            return Ok(());
        }
        let text = apply_edits(&self.text(), &plan.edits);
        self.set_text(&text);
        if let Some(cursor) = plan.selections.as_ref().and_then(|s| s.first()) {
            self.set_cursor(cursor.start);
        }
        self.refresh()
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod document_tests;
