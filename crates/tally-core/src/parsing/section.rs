/// Literal markers that open and close a statement's transaction table.
#[derive(Debug, Clone, Copy)]
pub struct SectionMarkers {
    /// A line containing any of these opens the section.
    pub start: &'static [&'static str],
    /// A line containing any of these closes it.
    pub end: &'static [&'static str],
    /// A line starting with any of these closes it.
    pub end_prefixes: &'static [&'static str],
    /// Whether a later start marker may reopen a closed section.
    pub reentrant: bool,
}

impl SectionMarkers {
    pub fn is_start(&self, line: &str) -> bool {
        self.start.iter().any(|m| line.contains(m))
    }

    pub fn is_end(&self, line: &str) -> bool {
        self.end.iter().any(|m| line.contains(m))
            || self.end_prefixes.iter().any(|p| line.starts_with(p))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    BeforeSection,
    InSection,
    /// Closed for good (non-reentrant markers only).
    Finished,
}

/// What a single line means to the section boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEvent {
    /// The line is a start marker; the section is now open.
    Started,
    /// The line is an end marker; the section is now closed.
    Ended,
    /// The line lies inside the section and should be classified.
    Row,
    /// The line lies outside any section and must be ignored.
    Outside,
}

/// Tracks whether the scan is inside a statement's transaction table.
///
/// Start markers are checked before end markers, so a start line always
/// (re)opens the section, even when it also contains end text.
#[derive(Debug, Clone)]
pub struct SectionScanner {
    markers: SectionMarkers,
    state: ScanState,
}

impl SectionScanner {
    pub fn new(markers: SectionMarkers) -> Self {
        SectionScanner {
            markers,
            state: ScanState::BeforeSection,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn in_section(&self) -> bool {
        self.state == ScanState::InSection
    }

    pub fn feed(&mut self, line: &str) -> SectionEvent {
        if self.state == ScanState::Finished {
            return SectionEvent::Outside;
        }

        if self.markers.is_start(line) {
            self.state = ScanState::InSection;
            return SectionEvent::Started;
        }

        if self.state == ScanState::InSection && self.markers.is_end(line) {
            self.state = if self.markers.reentrant {
                ScanState::BeforeSection
            } else {
                ScanState::Finished
            };
            return SectionEvent::Ended;
        }

        match self.state {
            ScanState::InSection => SectionEvent::Row,
            _ => SectionEvent::Outside,
        }
    }
}
