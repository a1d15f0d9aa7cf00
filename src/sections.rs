use std::collections::BTreeSet;

pub const INTERSECTION_THRESHOLD: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Home,
    About,
    Education,
    Project,
    Resume,
    Contact,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Self::Home,
        Self::About,
        Self::Education,
        Self::Project,
        Self::Resume,
        Self::Contact,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::About => "About",
            Self::Education => "Education",
            Self::Project => "Project",
            Self::Resume => "Resume",
            Self::Contact => "Contact",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_id(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.id() == value)
    }

    pub fn from_fragment(fragment: &str) -> Option<Self> {
        Self::from_id(fragment.strip_prefix('#').unwrap_or(fragment))
    }

    pub fn href(self) -> String {
        format!("#{}", self.id())
    }

    pub fn label(self) -> &'static str {
        self.id()
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Home => "🚀",
            Self::About => "😎",
            Self::Education => "🎓",
            Self::Project => "⚒️",
            Self::Resume => "📑",
            Self::Contact => "📲",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Intersection<'a> {
    pub target_id: &'a str,
    pub is_intersecting: bool,
    pub ratio: f64,
}

impl Intersection<'_> {
    fn qualifies(&self) -> bool {
        self.is_intersecting && self.ratio >= INTERSECTION_THRESHOLD
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionFocus {
    active: Section,
}

impl Default for SectionFocus {
    fn default() -> Self {
        Self {
            active: Section::Home,
        }
    }
}

impl SectionFocus {
    pub fn seeded(fragment: Option<&str>) -> Self {
        let active = fragment
            .and_then(Section::from_fragment)
            .unwrap_or(Section::Home);
        Self { active }
    }

    pub fn active(&self) -> Section {
        self.active
    }

    pub fn navigate(&mut self, section: Section) -> bool {
        let changed = self.active != section;
        self.active = section;
        changed
    }

    /// The last qualifying entry of the batch wins.
    pub fn observe_batch<'a, I>(&mut self, entries: I) -> bool
    where
        I: IntoIterator<Item = Intersection<'a>>,
    {
        let winner = entries
            .into_iter()
            .filter(|entry| entry.qualifies())
            .filter_map(|entry| Section::from_id(entry.target_id))
            .last();

        match winner {
            Some(section) => self.navigate(section),
            None => false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ObservationSet {
    observed: BTreeSet<Section>,
}

impl ObservationSet {
    pub fn attach_ready<F>(&mut self, mut is_available: F) -> Vec<Section>
    where
        F: FnMut(Section) -> bool,
    {
        let mut attached = Vec::new();
        for section in Section::ALL {
            if self.observed.contains(&section) || !is_available(section) {
                continue;
            }
            self.observed.insert(section);
            attached.push(section);
        }
        attached
    }

    pub fn is_complete(&self) -> bool {
        self.observed.len() == Section::ALL.len()
    }

    pub fn clear(&mut self) {
        self.observed.clear();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevealSet {
    revealed: BTreeSet<Section>,
}

impl RevealSet {
    pub fn all() -> Self {
        Self {
            revealed: Section::ALL.into_iter().collect(),
        }
    }

    pub fn reveal_all(&mut self) -> bool {
        let changed = !self.is_complete();
        self.revealed.extend(Section::ALL);
        changed
    }

    fn is_complete(&self) -> bool {
        self.revealed.len() == Section::ALL.len()
    }

    pub fn is_revealed(&self, section: Section) -> bool {
        self.revealed.contains(&section)
    }

    pub fn observe_batch<'a, I>(&mut self, entries: I) -> bool
    where
        I: IntoIterator<Item = Intersection<'a>>,
    {
        let mut changed = false;
        for entry in entries {
            if !entry.is_intersecting {
                continue;
            }
            if let Some(section) = Section::from_id(entry.target_id) {
                changed |= self.revealed.insert(section);
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(target_id: &str, ratio: f64) -> Intersection<'_> {
        Intersection {
            target_id,
            is_intersecting: true,
            ratio,
        }
    }

    fn leaving(target_id: &str) -> Intersection<'_> {
        Intersection {
            target_id,
            is_intersecting: false,
            ratio: 0.0,
        }
    }

    #[test]
    fn ids_round_trip_through_fragments() {
        for section in Section::ALL {
            assert_eq!(Section::from_fragment(&section.href()), Some(section));
            assert_eq!(Section::from_fragment(section.id()), Some(section));
            assert_eq!(Section::ALL[section.index()], section);
        }
        assert_eq!(Section::from_fragment("#project"), None);
        assert_eq!(Section::from_fragment(""), None);
        assert_eq!(Section::from_fragment("#"), None);
    }

    #[test]
    fn seeding_prefers_fragment_then_home() {
        assert_eq!(SectionFocus::seeded(Some("#Resume")).active(), Section::Resume);
        assert_eq!(SectionFocus::seeded(Some("#nope")).active(), Section::Home);
        assert_eq!(SectionFocus::seeded(None).active(), Section::Home);
    }

    #[test]
    fn qualifying_intersections_move_focus() {
        let mut focus = SectionFocus::default();

        assert!(focus.observe_batch([visible("Project", 0.62)]));
        assert_eq!(focus.active(), Section::Project);

        assert!(focus.observe_batch([leaving("Project"), visible("Contact", 0.5)]));
        assert_eq!(focus.active(), Section::Contact);
    }

    #[test]
    fn sub_threshold_and_unknown_targets_are_ignored() {
        let mut focus = SectionFocus::seeded(Some("#About"));

        assert!(!focus.observe_batch([
            visible("Education", 0.49),
            visible("footer", 1.0),
            leaving("About"),
        ]));
        assert_eq!(focus.active(), Section::About);
    }

    #[test]
    fn last_qualifying_entry_in_batch_wins() {
        let mut focus = SectionFocus::default();

        focus.observe_batch([
            visible("Education", 0.9),
            visible("Resume", 0.55),
            visible("Home", 0.2),
        ]);
        assert_eq!(focus.active(), Section::Resume);
    }

    #[test]
    fn exactly_one_section_is_active() {
        let mut focus = SectionFocus::default();
        focus.observe_batch([visible("About", 0.8), visible("Contact", 0.7)]);

        let active: Vec<_> = Section::ALL
            .into_iter()
            .filter(|section| *section == focus.active())
            .collect();
        assert_eq!(active, vec![Section::Contact]);
    }

    #[test]
    fn navigation_overrides_until_next_intersection() {
        let mut focus = SectionFocus::default();

        assert!(focus.navigate(Section::Education));
        assert!(!focus.navigate(Section::Education));
        assert_eq!(focus.active(), Section::Education);

        focus.observe_batch([visible("Project", 0.75)]);
        assert_eq!(focus.active(), Section::Project);
    }

    #[test]
    fn observation_attaches_each_section_once_as_it_mounts() {
        let mut set = ObservationSet::default();

        let first = set.attach_ready(|section| section != Section::Contact);
        assert_eq!(first.len(), 5);
        assert!(!set.is_complete());

        assert!(set.attach_ready(|section| section != Section::Contact).is_empty());

        assert_eq!(set.attach_ready(|_| true), vec![Section::Contact]);
        assert!(set.is_complete());

        set.clear();
        assert_eq!(set.attach_ready(|_| true).len(), 6);
    }

    #[test]
    fn reveal_is_sticky() {
        let mut reveal = RevealSet::default();

        assert!(reveal.observe_batch([visible("About", 0.1)]));
        assert!(!reveal.observe_batch([leaving("About")]));
        assert!(reveal.is_revealed(Section::About));
        assert!(!reveal.is_revealed(Section::Contact));

        assert!(Section::ALL.into_iter().all(|s| RevealSet::all().is_revealed(s)));
    }

    #[test]
    fn reveal_all_uncovers_everything_once() {
        let mut reveal = RevealSet::default();
        reveal.observe_batch([visible("Home", 1.0)]);

        assert!(reveal.reveal_all());
        assert!(!reveal.reveal_all());
        assert_eq!(reveal, RevealSet::all());
    }
}
