//! Shareable view links: camera position, zoom and an optional selected node
//! serialized as query parameters (`x`, `y`, `z`, `node`).

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use super::camera::clamp_zoom;

/// Largest camera offset a link may carry, in either direction.
pub const MAX_LINK_OFFSET: f64 = 1_000_000.0;

/// Bytes left unescaped in node ids: the RFC 3986 unreserved set.
const NODE_ID: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Camera view plus selection, as carried by a share link.
#[derive(Clone, Debug, PartialEq)]
pub struct ShareLink {
	/// Camera offset x in screen pixels.
	pub x: f64,
	/// Camera offset y in screen pixels.
	pub y: f64,
	/// Zoom, always within the camera's range.
	pub zoom: f64,
	/// Id of the selected node, if any.
	pub node: Option<String>,
}

impl Default for ShareLink {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			zoom: 1.0,
			node: None,
		}
	}
}

impl ShareLink {
	/// `x=<int>&y=<int>&z=<2dp>[&node=<id>]`
	pub fn to_query(&self) -> String {
		let mut query = format!(
			"x={}&y={}&z={:.2}",
			self.x.round() as i64,
			self.y.round() as i64,
			self.zoom
		);
		if let Some(node) = &self.node {
			query.push_str("&node=");
			query.extend(utf8_percent_encode(node, NODE_ID));
		}
		query
	}

	/// Parse a query string. Missing or malformed values fall back to defaults
	/// and offsets are clamped to [`MAX_LINK_OFFSET`].
	pub fn parse(query: &str) -> Self {
		let mut link = Self::default();
		for pair in query.trim_start_matches('?').split('&') {
			let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
			match key {
				"x" => link.x = parse_finite(value).map_or(0.0, clamp_offset),
				"y" => link.y = parse_finite(value).map_or(0.0, clamp_offset),
				"z" => link.zoom = parse_finite(value).map_or(1.0, clamp_zoom),
				"node" => link.node = Some(decode_component(value)).filter(|id| !id.is_empty()),
				_ => {}
			}
		}
		link
	}
}

fn parse_finite(value: &str) -> Option<f64> {
	value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn clamp_offset(value: f64) -> f64 {
	value.clamp(-MAX_LINK_OFFSET, MAX_LINK_OFFSET)
}

/// Form-style decoding: `+` is a space, malformed escapes stay literal.
fn decode_component(value: &str) -> String {
	percent_decode_str(&value.replace('+', " "))
		.decode_utf8_lossy()
		.into_owned()
}
