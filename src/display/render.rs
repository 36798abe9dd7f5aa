/// Markup construction for the sensors panel
use crate::models::DeviceReading;

/// How the per-device blocks are combined into the final fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Each block replaces the previous one, so only the last device shows.
    /// Matches the long-standing behavior of the garden page.
    LastOnly,
    /// Blocks are appended in list order.
    All,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub mode: RenderMode,
    pub escape: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            mode: RenderMode::LastOnly,
            escape: true,
        }
    }
}

/// Convert Celsius to Fahrenheit: F = 9C/5 + 32
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    9.0 * celsius / 5.0 + 32.0
}

// Negative zero prints as "-0"; show it as plain zero
fn unsigned_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Escape text for insertion into element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the block for a single device
///
/// # Arguments
/// * `device` - Reading to display
/// * `ts` - Cache-busting timestamp appended to the image URL
/// * `escape` - Whether backend strings are escaped before insertion
pub fn render_device(device: &DeviceReading, ts: i64, escape: bool) -> String {
    let (name, macid) = if escape {
        (escape_html(&device.name), escape_html(&device.macid))
    } else {
        (device.name.clone(), device.macid.clone())
    };

    let mut html = String::from("<div class=\"thdata\">");
    html += &format!("<span>{}({}): </span>", name, macid);
    html += &format!(
        "<span>T = {} C ({} F),</span>",
        unsigned_zero(device.temperature),
        unsigned_zero(celsius_to_fahrenheit(device.temperature))
    );
    html += &format!("<span> H = {} % </span>", unsigned_zero(device.humidity));
    html += "</div>";
    html += &format!(
        "<div class=\"imdiv\"><img src=\"image/{}?ts={}\"></div>",
        macid, ts
    );
    html += "<hr/>";
    html
}

/// Build the fragment for the whole device list
pub fn render_devices(devices: &[DeviceReading], ts: i64, options: RenderOptions) -> String {
    match options.mode {
        RenderMode::LastOnly => devices
            .last()
            .map(|device| render_device(device, ts, options.escape))
            .unwrap_or_default(),
        RenderMode::All => devices
            .iter()
            .map(|device| render_device(device, ts, options.escape))
            .collect(),
    }
}
