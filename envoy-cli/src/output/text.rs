//! Text output formatting with event trees and colors.

use envoy_carriers::CarrierDescriptor;
use envoy_core::{Classification, Parcel, ParcelEvent};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

// Event markers
const ICON_DELIVERED: &str = "✓";
const ICON_EVENT: &str = "•";
const ICON_ERROR: &str = "✗";

// Tree branches
const BRANCH_ONLY: &str = "└─── ";
const BRANCH_FIRST: &str = "└─┬─ ";
const BRANCH_MIDDLE: &str = "  ├─ ";
const BRANCH_LAST: &str = "  └─ ";

/// Event timestamp format, rendered in the event's own offset.
const TIMESTAMP_FORMAT: &str = "%a, %b %d %Y %H:%M";

/// Projected delivery date format.
const DATE_FORMAT: &str = "%a, %b %d %Y";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Formats one event on a single line, prefixed by timestamp and number.
    pub fn format_event_oneline(&self, tracking_number: &str, event: &ParcelEvent) -> String {
        format!(
            "{} {} {}",
            self.dim(&event.timestamp.format(TIMESTAMP_FORMAT).to_string()),
            tracking_number,
            event_body(event)
        )
    }

    fn format_event_entry(&self, event: &ParcelEvent) -> String {
        format!(
            "{} {} {}",
            self.event_icon(event),
            self.dim(&event.timestamp.format(TIMESTAMP_FORMAT).to_string()),
            event_body(event)
        )
    }

    fn event_icon(&self, event: &ParcelEvent) -> String {
        if event.is_delivered() {
            self.green(ICON_DELIVERED)
        } else if event.event_type.is_exception() {
            self.red(ICON_EVENT)
        } else {
            ICON_EVENT.to_string()
        }
    }

    // ========================================================================
    // Parcels
    // ========================================================================

    /// Formats a parcel header followed by its event tree, oldest first.
    ///
    /// The header icon and label come from the most recent event. A failed
    /// parcel gets an error header; any stored events still follow it.
    pub fn format_history(&self, parcel: &Parcel) -> String {
        let mut out = self.format_header(parcel);
        out.push('\n');

        let events = parcel
            .data
            .as_ref()
            .map(|d| d.chronological())
            .unwrap_or_default();

        let count = events.len();
        for (i, event) in events.into_iter().enumerate() {
            let branch = match (i, count) {
                (_, 1) => BRANCH_ONLY,
                (0, _) => BRANCH_FIRST,
                (i, n) if i + 1 == n => BRANCH_LAST,
                _ => BRANCH_MIDDLE,
            };
            out.push_str(branch);
            out.push_str(&self.format_event_entry(event));
            out.push('\n');
        }

        if let Some(projection) = parcel
            .data
            .as_ref()
            .filter(|d| !d.delivered)
            .and_then(|d| d.delivery_projection)
        {
            out.push_str(&format!(
                "  expected {}\n",
                self.yellow(&projection.format(DATE_FORMAT).to_string())
            ));
        }

        out
    }

    fn format_header(&self, parcel: &Parcel) -> String {
        let title = format!("{} ({})", self.bold(&parcel.name), parcel.carrier);

        if let Some(error) = &parcel.error {
            return format!("{} {} {}", self.red(ICON_ERROR), title, self.red(error));
        }

        match parcel.last_event() {
            Some(event) => format!(
                "{} {} {}",
                self.event_icon(event),
                title,
                self.status_label(event)
            ),
            None => format!("{ICON_EVENT} {title} {}", self.dim("NO EVENTS")),
        }
    }

    fn status_label(&self, event: &ParcelEvent) -> String {
        let label = event.event_type.label();
        if event.is_delivered() {
            self.green(label)
        } else if event.event_type.is_exception() {
            self.red(label)
        } else {
            self.bold(label)
        }
    }

    /// Formats a stored parcel as one line: its most recent event.
    ///
    /// A user-assigned name is appended in parentheses.
    pub fn format_list_line(&self, parcel: &Parcel) -> String {
        let line = match (&parcel.error, parcel.last_event()) {
            (_, Some(event)) => self.format_event_oneline(&parcel.tracking_number, event),
            (Some(_), None) => return self.format_header(parcel),
            (None, None) => format!(
                "{} {} {}",
                self.dim("-"),
                parcel.tracking_number,
                self.dim("NO EVENTS")
            ),
        };

        if parcel.has_default_name() {
            line
        } else {
            format!("{line} ({})", self.bold(&parcel.name))
        }
    }

    // ========================================================================
    // Carriers
    // ========================================================================

    /// Formats a tracking number's classification.
    pub fn format_classification(&self, tracking_number: &str, classification: &Classification) -> String {
        let format = classification
            .format
            .map_or_else(|| self.dim("unrecognized"), ToString::to_string);
        format!("{tracking_number:<34} {:<10} {format}", classification.carrier.display_name())
    }

    /// Formats the carrier table header.
    pub fn format_carriers_header(&self) -> String {
        format!(
            "{:<10} {:<10} {:<9} {:<12} {}",
            "Carrier", "CLI", "Tracking", "Credentials", "Website"
        )
    }

    /// Formats one row of the carrier table.
    pub fn format_carrier_line(&self, desc: &CarrierDescriptor, configured: bool) -> String {
        let tracking = if desc.is_trackable() { ICON_DELIVERED } else { "−" };
        let credentials = match (desc.is_trackable(), configured) {
            (false, _) => "−",
            (true, true) => ICON_DELIVERED,
            (true, false) => ICON_ERROR,
        };

        format!(
            "{:<10} {:<10} {:<9} {:<12} {}",
            desc.display_name(),
            desc.cli_name(),
            tracking,
            credentials,
            desc.metadata.website
        )
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }
}

fn event_body(event: &ParcelEvent) -> String {
    if event.location.is_empty() {
        event.description.clone()
    } else {
        format!("{} @ {}", event.description, event.location)
    }
}

// ============================================================================
// Tests
// ============================================================================
