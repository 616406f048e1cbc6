#![forbid(unsafe_code)]

//! Step options, layered defaults, and validation.
//!
//! A tour author writes [`StepOption`]s: partial records where every field
//! is optional. Before a tour starts, each step is layered over the user
//! defaults and the per-initialize defaults, then resolved against the
//! built-in defaults into a [`Step`].
//!
//! # Layering
//!
//! ```text
//! built-in ← user defaults (set_defaults) ← initialize defaults ← step
//! ```
//!
//! A later layer overrides an earlier one only where it holds `Some`. `None`
//! never clears a value. Nested records (`scroll_settings`,
//! `step_dimensions`, `backdrop_config`) merge field by field rather than
//! being replaced wholesale.

use std::fmt;
use std::time::Duration;

use waypoint_core::{Coordinates, ScrollContainer, ScrollSettings};

use crate::error::TourError;

/// Field-wise overlay of one partial record onto another.
pub trait Overlay: Clone {
    /// Return `self` layered on top of `base`.
    #[must_use]
    fn merge_over(&self, base: &Self) -> Self;
}

impl<T: Overlay> Overlay for Option<T> {
    fn merge_over(&self, base: &Self) -> Self {
        match (self, base) {
            (Some(top), Some(bottom)) => Some(top.merge_over(bottom)),
            (Some(top), None) => Some(top.clone()),
            (None, bottom) => bottom.clone(),
        }
    }
}

/// Build `Self` from two records: leaf fields take the top value when
/// present, nested fields recurse through [`Overlay`].
macro_rules! overlay_fields {
    ($top:expr, $base:expr; leaf: [$($leaf:ident),* $(,)?]; nested: [$($nested:ident),* $(,)?]) => {
        Self {
            $($leaf: $top.$leaf.clone().or_else(|| $base.$leaf.clone()),)*
            $($nested: $top.$nested.merge_over(&$base.$nested),)*
        }
    };
}

/// Reference to a step: position in the tour or its `step_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(untagged))]
pub enum StepRef {
    Index(usize),
    Id(String),
}

impl fmt::Display for StepRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Id(id) => write!(f, "\"{id}\""),
        }
    }
}

impl From<usize> for StepRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for StepRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_owned())
    }
}

impl From<String> for StepRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

/// Route a step lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(untagged))]
pub enum Route {
    /// An application URL such as `/settings?tab=2#profile`.
    Url(String),
    /// Path segments, joined into an absolute path.
    Segments(Vec<String>),
}

impl Route {
    /// The URL handed to the navigator.
    pub fn to_url(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Segments(segments) => {
                let joined = segments
                    .iter()
                    .map(|s| s.trim_matches('/'))
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("/");
                format!("/{joined}")
            }
        }
    }
}

impl From<&str> for Route {
    fn from(url: &str) -> Self {
        Self::Url(url.to_owned())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

/// What to do when an anchor id is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum DuplicateAnchorHandling {
    /// Refuse the second registration with an error.
    #[default]
    Error,
    /// Keep the first handle, silently drop later ones.
    RegisterFirst,
    /// Replace the existing handle with the newest one.
    RegisterLast,
}

/// Preferred popover side, for renderers that support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum Placement {
    Top,
    TopStart,
    TopEnd,
    Bottom,
    BottomStart,
    BottomEnd,
    Left,
    LeftStart,
    LeftEnd,
    Right,
    RightStart,
    RightEnd,
}

/// Popover sizing as CSS lengths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct StepDimensions {
    pub width: Option<String>,
    pub min_width: Option<String>,
    pub max_width: Option<String>,
}

impl StepDimensions {
    fn builtin() -> Self {
        Self {
            width: Some("auto".into()),
            min_width: Some("250px".into()),
            max_width: Some("280px".into()),
        }
    }
}

impl Overlay for StepDimensions {
    fn merge_over(&self, base: &Self) -> Self {
        overlay_fields!(self, base; leaf: [width, min_width, max_width]; nested: [])
    }
}

/// Backdrop appearance. Unset fields are left to the backdrop renderer.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct BackdropConfig {
    /// Padding (px) between the anchor and the cut-out.
    pub offset: Option<f64>,
    pub z_index: Option<String>,
    pub background_color: Option<String>,
    /// Selector of the element the backdrop is attached to.
    pub parent_container: Option<String>,
}

impl Overlay for BackdropConfig {
    fn merge_over(&self, base: &Self) -> Self {
        overlay_fields!(self, base;
            leaf: [offset, z_index, background_color, parent_container];
            nested: [])
    }
}

/// Partial scroll preferences, resolved into [`ScrollSettings`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ScrollOptions {
    pub disable_scroll_to_anchor: Option<bool>,
    pub center_anchor_on_scroll: Option<bool>,
    pub smooth_scroll: Option<bool>,
    pub disable_page_scrolling: Option<bool>,
    pub scroll_container: Option<ScrollContainer>,
    pub coordinates: Option<Coordinates>,
}

impl ScrollOptions {
    /// Fill unset fields from the built-in defaults.
    pub fn resolve(&self) -> ScrollSettings {
        let builtin = ScrollSettings::default();
        ScrollSettings {
            disable_scroll_to_anchor: self
                .disable_scroll_to_anchor
                .unwrap_or(builtin.disable_scroll_to_anchor),
            center_anchor_on_scroll: self
                .center_anchor_on_scroll
                .unwrap_or(builtin.center_anchor_on_scroll),
            smooth_scroll: self.smooth_scroll.unwrap_or(builtin.smooth_scroll),
            disable_page_scrolling: self
                .disable_page_scrolling
                .unwrap_or(builtin.disable_page_scrolling),
            scroll_container: self.scroll_container.clone(),
            coordinates: self.coordinates.unwrap_or(builtin.coordinates),
        }
    }
}

impl Overlay for ScrollOptions {
    fn merge_over(&self, base: &Self) -> Self {
        overlay_fields!(self, base;
            leaf: [
                disable_scroll_to_anchor,
                center_anchor_on_scroll,
                smooth_scroll,
                disable_page_scrolling,
                scroll_container,
                coordinates,
            ];
            nested: [])
    }
}

/// One tour step as written by the author. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct StepOption {
    pub step_id: Option<String>,
    pub anchor_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub route: Option<Route>,
    pub next_step: Option<StepRef>,
    pub prev_step: Option<StepRef>,
    pub disable_prev_step: Option<bool>,
    pub scroll_settings: Option<ScrollOptions>,
    pub prev_btn_title: Option<String>,
    pub next_btn_title: Option<String>,
    pub end_btn_title: Option<String>,
    pub enable_backdrop: Option<bool>,
    pub backdrop_config: Option<BackdropConfig>,
    pub is_async: Option<bool>,
    #[cfg_attr(feature = "config", serde(with = "duration_ms"))]
    pub async_step_timeout: Option<Duration>,
    pub is_optional: Option<bool>,
    #[cfg_attr(feature = "config", serde(with = "duration_ms"))]
    pub delay_after_navigation: Option<Duration>,
    #[cfg_attr(feature = "config", serde(with = "duration_ms"))]
    pub delay_before_step_show: Option<Duration>,
    pub next_on_anchor_click: Option<bool>,
    pub duplicate_anchor_handling: Option<DuplicateAnchorHandling>,
    pub allow_user_initiated_navigation: Option<bool>,
    pub step_dimensions: Option<StepDimensions>,
    pub popover_class: Option<String>,
    pub show_progress: Option<bool>,
    pub placement: Option<Placement>,
}

impl Overlay for StepOption {
    fn merge_over(&self, base: &Self) -> Self {
        overlay_fields!(self, base;
            leaf: [
                step_id,
                anchor_id,
                title,
                content,
                route,
                next_step,
                prev_step,
                disable_prev_step,
                prev_btn_title,
                next_btn_title,
                end_btn_title,
                enable_backdrop,
                is_async,
                async_step_timeout,
                is_optional,
                delay_after_navigation,
                delay_before_step_show,
                next_on_anchor_click,
                duplicate_anchor_handling,
                allow_user_initiated_navigation,
                popover_class,
                show_progress,
                placement,
            ];
            nested: [scroll_settings, backdrop_config, step_dimensions])
    }
}

impl StepOption {
    /// A step bound to `anchor_id`.
    pub fn anchored(anchor_id: impl Into<String>) -> Self {
        Self {
            anchor_id: Some(anchor_id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn step_id(mut self, id: impl Into<String>) -> Self {
        self.step_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn route(mut self, route: impl Into<Route>) -> Self {
        self.route = Some(route.into());
        self
    }

    #[must_use]
    pub fn next_step(mut self, target: impl Into<StepRef>) -> Self {
        self.next_step = Some(target.into());
        self
    }

    #[must_use]
    pub fn prev_step(mut self, target: impl Into<StepRef>) -> Self {
        self.prev_step = Some(target.into());
        self
    }

    #[must_use]
    pub fn optional(mut self, optional: bool) -> Self {
        self.is_optional = Some(optional);
        self
    }

    /// Wait for the anchor to register, bounded by `timeout` when given.
    #[must_use]
    pub fn asynchronous(mut self, timeout: Option<Duration>) -> Self {
        self.is_async = Some(true);
        self.async_step_timeout = timeout;
        self
    }

    #[must_use]
    pub fn delay_before_step_show(mut self, delay: Duration) -> Self {
        self.delay_before_step_show = Some(delay);
        self
    }

    #[must_use]
    pub fn delay_after_navigation(mut self, delay: Duration) -> Self {
        self.delay_after_navigation = Some(delay);
        self
    }

    #[must_use]
    pub fn scroll(mut self, options: ScrollOptions) -> Self {
        self.scroll_settings = Some(options);
        self
    }

    #[must_use]
    pub fn backdrop(mut self, enabled: bool) -> Self {
        self.enable_backdrop = Some(enabled);
        self
    }

    #[must_use]
    pub fn next_on_anchor_click(mut self, enabled: bool) -> Self {
        self.next_on_anchor_click = Some(enabled);
        self
    }

    #[must_use]
    pub fn disable_prev_step(mut self, disabled: bool) -> Self {
        self.disable_prev_step = Some(disabled);
        self
    }

    #[must_use]
    pub fn allow_user_initiated_navigation(mut self, allowed: bool) -> Self {
        self.allow_user_initiated_navigation = Some(allowed);
        self
    }

    #[must_use]
    pub fn duplicate_anchor_handling(mut self, policy: DuplicateAnchorHandling) -> Self {
        self.duplicate_anchor_handling = Some(policy);
        self
    }

    /// Layer `self` over each of `layers`, lowest priority first.
    pub fn layered(&self, layers: &[Option<&StepOption>]) -> StepOption {
        let base = layers
            .iter()
            .flatten()
            .fold(StepOption::default(), |acc, layer| layer.merge_over(&acc));
        self.merge_over(&base)
    }
}

/// A fully resolved step. Immutable once the tour is initialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub step_id: Option<String>,
    pub anchor_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub route: Option<Route>,
    pub next_step: Option<StepRef>,
    pub prev_step: Option<StepRef>,
    pub disable_prev_step: bool,
    pub scroll_settings: ScrollSettings,
    pub prev_btn_title: String,
    pub next_btn_title: String,
    pub end_btn_title: String,
    pub enable_backdrop: bool,
    pub backdrop_config: BackdropConfig,
    pub is_async: bool,
    pub async_step_timeout: Option<Duration>,
    pub is_optional: bool,
    pub delay_after_navigation: Duration,
    pub delay_before_step_show: Duration,
    pub next_on_anchor_click: bool,
    pub duplicate_anchor_handling: DuplicateAnchorHandling,
    pub allow_user_initiated_navigation: bool,
    pub step_dimensions: StepDimensions,
    pub popover_class: Option<String>,
    pub show_progress: bool,
    pub placement: Option<Placement>,
}

impl Default for Step {
    fn default() -> Self {
        Self::resolve(&StepOption::default())
    }
}

impl Step {
    /// Resolve a (layered) option record against the built-in defaults.
    pub fn resolve(option: &StepOption) -> Self {
        Self {
            step_id: option.step_id.clone(),
            anchor_id: option.anchor_id.clone(),
            title: option.title.clone(),
            content: option.content.clone(),
            route: option.route.clone(),
            next_step: option.next_step.clone(),
            prev_step: option.prev_step.clone(),
            disable_prev_step: option.disable_prev_step.unwrap_or(false),
            scroll_settings: option
                .scroll_settings
                .as_ref()
                .map(ScrollOptions::resolve)
                .unwrap_or_default(),
            prev_btn_title: option.prev_btn_title.clone().unwrap_or_else(|| "Prev".into()),
            next_btn_title: option.next_btn_title.clone().unwrap_or_else(|| "Next".into()),
            end_btn_title: option.end_btn_title.clone().unwrap_or_else(|| "End".into()),
            enable_backdrop: option.enable_backdrop.unwrap_or(false),
            backdrop_config: option.backdrop_config.clone().unwrap_or_default(),
            is_async: option.is_async.unwrap_or(false),
            async_step_timeout: option.async_step_timeout.filter(|t| !t.is_zero()),
            is_optional: option.is_optional.unwrap_or(false),
            delay_after_navigation: option
                .delay_after_navigation
                .unwrap_or(Duration::from_millis(100)),
            delay_before_step_show: option.delay_before_step_show.unwrap_or(Duration::ZERO),
            next_on_anchor_click: option.next_on_anchor_click.unwrap_or(false),
            duplicate_anchor_handling: option.duplicate_anchor_handling.unwrap_or_default(),
            allow_user_initiated_navigation: option
                .allow_user_initiated_navigation
                .unwrap_or(false),
            step_dimensions: option
                .step_dimensions
                .merge_over(&Some(StepDimensions::builtin()))
                .unwrap_or_default(),
            popover_class: option.popover_class.clone(),
            show_progress: option.show_progress.unwrap_or(true),
            placement: option.placement,
        }
    }

    /// Check the step is usable.
    ///
    /// # Errors
    ///
    /// Returns [`TourError::InvalidStep`] when the step is both async and
    /// optional without an `async_step_timeout`: such a step could block the
    /// tour forever.
    pub fn validate(&self) -> Result<(), TourError> {
        if self.is_async && self.is_optional && self.async_step_timeout.is_none() {
            return Err(TourError::InvalidStep {
                anchor_id: self.anchor_id.clone(),
                reason: "a step can only be both async and optional when async_step_timeout is set",
            });
        }
        Ok(())
    }
}

#[cfg(feature = "config")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => {
                serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
            }
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_values() {
        let step = Step::default();
        assert_eq!(step.prev_btn_title, "Prev");
        assert_eq!(step.next_btn_title, "Next");
        assert_eq!(step.end_btn_title, "End");
        assert_eq!(step.delay_after_navigation, Duration::from_millis(100));
        assert_eq!(step.delay_before_step_show, Duration::ZERO);
        assert_eq!(step.duplicate_anchor_handling, DuplicateAnchorHandling::Error);
        assert!(step.show_progress);
        assert!(!step.enable_backdrop);
        assert!(step.scroll_settings.center_anchor_on_scroll);
        assert!(step.scroll_settings.smooth_scroll);
        assert!(step.scroll_settings.disable_page_scrolling);
        assert_eq!(step.step_dimensions.min_width.as_deref(), Some("250px"));
        assert_eq!(step.step_dimensions.max_width.as_deref(), Some("280px"));
        assert_eq!(step.step_dimensions.width.as_deref(), Some("auto"));
    }

    #[test]
    fn none_never_erases_lower_layers() {
        let user = StepOption {
            title: Some("from user".into()),
            enable_backdrop: Some(true),
            ..StepOption::default()
        };
        let step = StepOption::anchored("a");
        let merged = step.layered(&[Some(&user), None]);
        assert_eq!(merged.title.as_deref(), Some("from user"));
        assert_eq!(merged.enable_backdrop, Some(true));
        assert_eq!(merged.anchor_id.as_deref(), Some("a"));
    }

    #[test]
    fn later_layers_win() {
        let user = StepOption::default().title("user");
        let init = StepOption::default().title("init");
        let merged = StepOption::anchored("a").layered(&[Some(&user), Some(&init)]);
        assert_eq!(merged.title.as_deref(), Some("init"));

        let merged = StepOption::anchored("a")
            .title("step")
            .layered(&[Some(&user), Some(&init)]);
        assert_eq!(merged.title.as_deref(), Some("step"));
    }

    #[test]
    fn nested_scroll_settings_merge_field_by_field() {
        let defaults = StepOption::default().scroll(ScrollOptions {
            smooth_scroll: Some(false),
            center_anchor_on_scroll: Some(false),
            ..ScrollOptions::default()
        });
        let step = StepOption::anchored("a").scroll(ScrollOptions {
            center_anchor_on_scroll: Some(true),
            coordinates: Some(Coordinates::new(0.0, 40.0)),
            ..ScrollOptions::default()
        });
        let resolved = Step::resolve(&step.layered(&[Some(&defaults)]));
        assert!(!resolved.scroll_settings.smooth_scroll);
        assert!(resolved.scroll_settings.center_anchor_on_scroll);
        assert_eq!(resolved.scroll_settings.coordinates, Coordinates::new(0.0, 40.0));
        assert!(resolved.scroll_settings.disable_page_scrolling);
    }

    #[test]
    fn nested_dimensions_keep_builtin_fields() {
        let step = StepOption {
            step_dimensions: Some(StepDimensions {
                width: Some("400px".into()),
                ..StepDimensions::default()
            }),
            ..StepOption::anchored("a")
        };
        let resolved = Step::resolve(&step);
        assert_eq!(resolved.step_dimensions.width.as_deref(), Some("400px"));
        assert_eq!(resolved.step_dimensions.min_width.as_deref(), Some("250px"));
    }

    #[test]
    fn async_optional_without_timeout_is_invalid() {
        let step = Step::resolve(&StepOption::anchored("a").optional(true).asynchronous(None));
        let err = step.validate().expect_err("must be rejected");
        assert!(matches!(err, TourError::InvalidStep { .. }));

        let step = Step::resolve(
            &StepOption::anchored("a")
                .optional(true)
                .asynchronous(Some(Duration::from_millis(500))),
        );
        assert!(step.validate().is_ok());
    }

    #[test]
    fn zero_timeout_counts_as_missing() {
        let step = Step::resolve(
            &StepOption::anchored("a")
                .optional(true)
                .asynchronous(Some(Duration::ZERO)),
        );
        assert!(step.validate().is_err());
    }

    #[test]
    fn route_segments_join_into_absolute_path() {
        let route = Route::Segments(vec!["settings".into(), "/profile/".into()]);
        assert_eq!(route.to_url(), "/settings/profile");
        assert_eq!(Route::Segments(vec![]).to_url(), "/");
        assert_eq!(Route::from("/a?b=1").to_url(), "/a?b=1");
    }

    #[test]
    fn step_ref_display() {
        assert_eq!(StepRef::from(3_usize).to_string(), "3");
        assert_eq!(StepRef::from("intro").to_string(), "\"intro\"");
    }
}
