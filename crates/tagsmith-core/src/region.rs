//! Generic delimited-region state machine.
//!
//! Every tag family (blocks, injections, whole files, new files) is collected
//! by the same [`RegionCollector`], fed one line at a time. The collector only
//! reports what a line means; the caller decides which events are fatal.

use crate::tags::{self, TagFamily};

/// A closed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    /// 1-based line number of the begin tag.
    pub begin_line: usize,
    /// Lines strictly between the begin and end tags, exactly as fed.
    pub lines: Vec<String>,
}

impl Region {
    /// Concatenate the lines as fed (callers feeding lines with their
    /// terminators get the original text back).
    pub fn verbatim(&self) -> String {
        self.lines.concat()
    }

    /// Join terminator-less lines with `\n`.
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

/// What one line meant to the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A begin tag opened a region with this name.
    Opened(String),
    /// An end tag closed the open region.
    Closed(Region),
    /// The line was collected into the open region.
    Content,
    /// Nothing is open and the line is not a tag of this family.
    Outside,
    /// An end tag arrived while nothing was open.
    StrayEnd,
    /// A begin tag arrived while a region was open. The line was not
    /// collected and the open region is untouched.
    NestedBegin { name: String, open: String },
    /// A begin tag without a name.
    MissingName,
    /// A rooted family's begin tag whose name does not start with `/`.
    Unrooted(String),
}

#[derive(Debug)]
struct OpenRegion {
    name: String,
    begin_line: usize,
    lines: Vec<String>,
}

#[derive(Debug)]
pub struct RegionCollector {
    family: TagFamily,
    open: Option<OpenRegion>,
    line_no: usize,
}

impl RegionCollector {
    pub fn new(family: TagFamily) -> Self {
        Self {
            family,
            open: None,
            line_no: 0,
        }
    }

    /// 1-based number of the line most recently fed.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Name of the region currently being collected.
    pub fn open_name(&self) -> Option<&str> {
        self.open.as_ref().map(|o| o.name.as_str())
    }

    pub fn feed(&mut self, line: &str) -> Step {
        self.line_no += 1;
        let family = self.family;

        if tags::is_tag_word_line(line, family.begin) {
            let Some(name) = tags::parse_name_from_tag_line(line, family.begin) else {
                return self.collect_or(line, Step::MissingName);
            };
            if family.rooted && !name.starts_with('/') {
                return self.collect_or(line, Step::Unrooted(name));
            }
            if let Some(open) = &self.open {
                // Another path's tags inside a file body are just content.
                if family.named_end && open.name != name {
                    return self.collect(line);
                }
                return Step::NestedBegin {
                    name,
                    open: open.name.clone(),
                };
            }
            self.open = Some(OpenRegion {
                name: name.clone(),
                begin_line: self.line_no,
                lines: Vec::new(),
            });
            return Step::Opened(name);
        }

        if tags::is_tag_word_line(line, family.end) {
            let Some(open) = &self.open else {
                return Step::StrayEnd;
            };
            if family.named_end && !tags::is_tag_line_with_name(line, family.end, &open.name) {
                return self.collect(line);
            }
            return match self.open.take() {
                Some(open) => Step::Closed(Region {
                    name: open.name,
                    begin_line: open.begin_line,
                    lines: open.lines,
                }),
                None => Step::StrayEnd,
            };
        }

        self.collect(line)
    }

    /// Start a fresh region, abandoning whatever was open. Used by the
    /// scanner, where a nested begin switches to the new block.
    pub fn reopen(&mut self, name: String) -> Option<Region> {
        let previous = self.open.take().map(|o| Region {
            name: o.name,
            begin_line: o.begin_line,
            lines: o.lines,
        });
        self.open = Some(OpenRegion {
            name,
            begin_line: self.line_no,
            lines: Vec::new(),
        });
        previous
    }

    /// The region left open once input is exhausted.
    pub fn finish(self) -> Option<Region> {
        self.open.map(|o| Region {
            name: o.name,
            begin_line: o.begin_line,
            lines: o.lines,
        })
    }

    fn collect(&mut self, line: &str) -> Step {
        match &mut self.open {
            Some(open) => {
                open.lines.push(line.to_string());
                Step::Content
            }
            None => Step::Outside,
        }
    }

    /// Malformed begin tags inside a named-end region are content; anywhere
    /// else they are reported.
    fn collect_or(&mut self, line: &str, step: Step) -> Step {
        if self.family.named_end && self.open.is_some() {
            return self.collect(line);
        }
        step
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
