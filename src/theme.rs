pub const DARK_MODE_KEY: &str = "darkMode";
pub const DARK_CLASS: &str = "dark";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "true" => Some(Self::Dark),
            "false" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn stored_value(self) -> &'static str {
        match self {
            Self::Light => "false",
            Self::Dark => "true",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn toggle_label(self) -> String {
        let next = self.toggled().as_str();
        format!("Switch to {next} theme")
    }

    pub fn pressed(self) -> bool {
        self.is_dark()
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "☾",
            Self::Dark => "☀",
        }
    }
}

/// Storage and root-class access. Failures are swallowed: unreachable
/// storage reads as `None` and drops writes.
pub trait PreferenceHost {
    fn read_item(&self, key: &str) -> Option<String>;
    fn write_item(&self, key: &str, value: &str);
    fn system_prefers_dark(&self) -> bool;
    fn set_root_class(&self, class: &str, enabled: bool);
}

pub struct DarkModePreference<H> {
    host: H,
    current: Option<bool>,
    system_dark: Option<bool>,
}

impl<H: PreferenceHost> DarkModePreference<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            current: None,
            system_dark: None,
        }
    }

    #[cfg(test)]
    fn host(&self) -> &H {
        &self.host
    }

    pub fn get(&mut self) -> bool {
        if let Some(dark) = self.current {
            return dark;
        }

        if let Some(theme) = self
            .host
            .read_item(DARK_MODE_KEY)
            .as_deref()
            .and_then(Theme::from_stored)
        {
            return theme.is_dark();
        }

        let host = &self.host;
        *self
            .system_dark
            .get_or_insert_with(|| host.system_prefers_dark())
    }

    pub fn theme(&mut self) -> Theme {
        Theme::from_dark(self.get())
    }

    pub fn set(&mut self, dark: bool) {
        let theme = Theme::from_dark(dark);
        self.host.write_item(DARK_MODE_KEY, theme.stored_value());
        self.host.set_root_class(DARK_CLASS, dark);
        self.current = Some(dark);
    }

    pub fn toggle(&mut self) -> bool {
        let next = !self.get();
        self.set(next);
        next
    }

    /// Does not persist: an unset key keeps following the OS setting.
    pub fn apply_initial(&mut self) -> bool {
        let dark = self.get();
        self.host.set_root_class(DARK_CLASS, dark);
        dark
    }
}
