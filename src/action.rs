//! Action records and the value types they are built from.
//!
//! An [`Action`] binds keyboard and gamepad codes to a form (an idle or an
//! action) in the host game. Actions are plain values: once handed to the
//! [`ActionRegistry`](crate::registry::ActionRegistry) they are never mutated.

use std::fmt;

/// Raw input code. Keyboard and gamepad codes share one code space.
pub type InputCode = u32;

/// Identifier of a record in the host game's form database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormId(pub u32);

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// The kinds of form the dispatcher cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum FormKind {
    Idle,
    Action,
    Keyword,
    Other,
}

/// Reference to a form together with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormRef {
    pub id: FormId,
    pub kind: FormKind,
}

impl FormRef {
    pub fn new(id: u32, kind: FormKind) -> Self {
        Self {
            id: FormId(id),
            kind,
        }
    }

    pub fn idle(id: u32) -> Self {
        Self::new(id, FormKind::Idle)
    }

    pub fn action(id: u32) -> Self {
        Self::new(id, FormKind::Action)
    }

    /// Only idles and actions can be executed.
    pub fn is_executable(&self) -> bool {
        matches!(self.kind, FormKind::Idle | FormKind::Action)
    }
}

impl fmt::Display for FormRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.id)
    }
}

/// Keyword form used to filter paired-target candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeywordRef(pub FormId);

/// Index into the host's default-object table selecting the idle that
/// accompanies an Action-type form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssociatedIdle(pub u32);

impl AssociatedIdle {
    /// The standard "ActionIdle" default object.
    pub const ACTION_IDLE: Self = Self(104);

    /// Number of entries in the host's default-object table.
    pub const TABLE_SIZE: u32 = 364;

    /// Range-check a raw selector against a table of `table_size` entries.
    pub fn from_index(index: i64, table_size: u32) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .filter(|&index| index < table_size)
            .map(Self)
    }
}

impl Default for AssociatedIdle {
    fn default() -> Self {
        Self::ACTION_IDLE
    }
}

/// How a paired target is located, without the distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    None = 0,
    RayFromActor = 1,
    RayFromCamera = 2,
    Radius = 3,
}

impl SearchMode {
    /// Map the numeric mode used by configuration files.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::RayFromActor),
            2 => Some(Self::RayFromCamera),
            3 => Some(Self::Radius),
            _ => None,
        }
    }
}

/// Paired-target search with its distance.
///
/// A search is only ever enabled together with a positive distance, so the
/// "mode is None whenever distance ≤ 0" rule cannot be violated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PairedSearch {
    #[default]
    None,
    RayFromActor {
        distance: f32,
    },
    RayFromCamera {
        distance: f32,
    },
    Radius {
        distance: f32,
    },
}

impl PairedSearch {
    /// Build a search, falling back to `None` for non-positive (or NaN) distances.
    pub fn new(mode: SearchMode, distance: f32) -> Self {
        if distance.is_nan() || distance <= 0.0 {
            return Self::None;
        }
        match mode {
            SearchMode::None => Self::None,
            SearchMode::RayFromActor => Self::RayFromActor { distance },
            SearchMode::RayFromCamera => Self::RayFromCamera { distance },
            SearchMode::Radius => Self::Radius { distance },
        }
    }

    pub fn mode(&self) -> SearchMode {
        match self {
            Self::None => SearchMode::None,
            Self::RayFromActor { .. } => SearchMode::RayFromActor,
            Self::RayFromCamera { .. } => SearchMode::RayFromCamera,
            Self::Radius { .. } => SearchMode::Radius,
        }
    }

    pub fn distance(&self) -> Option<f32> {
        match *self {
            Self::None => None,
            Self::RayFromActor { distance }
            | Self::RayFromCamera { distance }
            | Self::Radius { distance } => Some(distance),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A configured binding from input codes to an executable form.
///
/// Equality is structural over every field, and the order of the code and
/// keyword vectors is part of an action's identity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Action {
    pub keys: Vec<InputCode>,
    pub gamepad_keys: Vec<InputCode>,
    pub paired_search: PairedSearch,
    pub paired_target_keywords: Vec<KeywordRef>,
    pub action_or_idle: Option<FormRef>,
    pub action_assoc_idle: AssociatedIdle,
    /// Seconds the triggering key must be held.
    pub press_duration: f32,
    pub priority: i32,
    pub triggers_on_release: bool,
}

impl Action {
    /// An action executing `form` with every other field at its default.
    pub fn new(form: FormRef) -> Self {
        Self {
            action_or_idle: Some(form),
            ..Self::default()
        }
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = InputCode>) -> Self {
        self.keys = keys.into_iter().collect();
        self
    }

    pub fn with_gamepad_keys(mut self, keys: impl IntoIterator<Item = InputCode>) -> Self {
        self.gamepad_keys = keys.into_iter().collect();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_press_duration(mut self, seconds: f32) -> Self {
        self.press_duration = seconds;
        self
    }

    pub fn with_paired_search(mut self, search: PairedSearch) -> Self {
        self.paired_search = search;
        self
    }

    pub fn with_target_keywords(mut self, keywords: impl IntoIterator<Item = KeywordRef>) -> Self {
        self.paired_target_keywords = keywords.into_iter().collect();
        self
    }

    pub fn with_assoc_idle(mut self, idle: AssociatedIdle) -> Self {
        self.action_assoc_idle = idle;
        self
    }

    pub fn on_release(mut self) -> Self {
        self.triggers_on_release = true;
        self
    }

    /// Keyboard codes followed by gamepad codes.
    pub fn bound_codes(&self) -> impl Iterator<Item = InputCode> + '_ {
        self.keys.iter().chain(self.gamepad_keys.iter()).copied()
    }

    pub fn has_bound_keys(&self) -> bool {
        !self.keys.is_empty() || !self.gamepad_keys.is_empty()
    }
}
