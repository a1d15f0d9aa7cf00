use crate::scroll::ScrollState;
use crate::sections::{
    Intersection, ObservationSet, RevealSet, Section, SectionFocus, INTERSECTION_THRESHOLD,
};
use crate::theme::{DarkModePreference, PreferenceHost, Theme};
use gloo_events::EventListener;
use js_sys::{Array, Function, Reflect};
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    ScrollBehavior, ScrollToOptions, Storage,
};
use yew::prelude::*;

const PROGRESS_FILL: &str = "#4F46E5";
const LINKEDIN_URL: &str = "https://id.linkedin.com/in/nur-azani-bayu-rezki-08369a219";
const GITHUB_URL: &str = "https://github.com/bayurz11";

fn log_degraded(event: &str) {
    web_sys::console::debug_1(&JsValue::from_str(&format!("portfolio: {event}")));
}

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

fn media_matches(query: &str) -> bool {
    window()
        .and_then(|w| w.match_media(query).ok().flatten())
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

fn prefers_reduced_motion() -> bool {
    media_matches("(prefers-reduced-motion: reduce)")
}

fn toggle_root_class(class: &str, enabled: bool) {
    if let Some(root) = window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    {
        let _ = root.class_list().toggle_with_force(class, enabled);
    }
}

fn toggle_root_class_with_transition(class: &str, enabled: bool) {
    if prefers_reduced_motion() {
        toggle_root_class(class, enabled);
        return;
    }

    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };

    let document_js: JsValue = document.into();
    let Ok(start_view_transition) =
        Reflect::get(&document_js, &JsValue::from_str("startViewTransition"))
    else {
        toggle_root_class(class, enabled);
        return;
    };

    let Some(start_view_transition) = start_view_transition.dyn_ref::<Function>() else {
        toggle_root_class(class, enabled);
        return;
    };

    let deferred_class = class.to_string();
    let update = Closure::once_into_js(move || toggle_root_class(&deferred_class, enabled));

    if start_view_transition.call1(&document_js, &update).is_err() {
        log_degraded("view transition rejected, applying theme directly");
        toggle_root_class(class, enabled);
    }
}

/// `localStorage`, `matchMedia` and the `<html>` class list.
#[derive(Clone, Copy)]
struct WebPreferenceHost {
    transitions: bool,
}

impl WebPreferenceHost {
    fn immediate() -> Self {
        Self { transitions: false }
    }

    fn animated() -> Self {
        Self { transitions: true }
    }
}

impl PreferenceHost for WebPreferenceHost {
    fn read_item(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn write_item(&self, key: &str, value: &str) {
        match local_storage() {
            Some(storage) => {
                let _ = storage.set_item(key, value);
            }
            None => log_degraded("storage unavailable, theme choice not persisted"),
        }
    }

    fn system_prefers_dark(&self) -> bool {
        media_matches("(prefers-color-scheme: dark)")
    }

    fn set_root_class(&self, class: &str, enabled: bool) {
        if self.transitions {
            toggle_root_class_with_transition(class, enabled);
        } else {
            toggle_root_class(class, enabled);
        }
    }
}

fn sample_scroll() -> ScrollState {
    let Some(win) = window() else {
        return ScrollState::default();
    };

    let scroll_top = win.scroll_y().unwrap_or(0.0);
    let viewport_height = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let document_height = win
        .document()
        .and_then(|d| d.document_element())
        .map(|root| f64::from(root.scroll_height()))
        .unwrap_or(0.0);

    ScrollState::new(scroll_top, document_height, viewport_height)
}

fn scroll_to_top() {
    if let Some(win) = window() {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(if prefers_reduced_motion() {
            ScrollBehavior::Auto
        } else {
            ScrollBehavior::Smooth
        });
        win.scroll_to_with_scroll_to_options(&options);
    }
}

fn current_fragment() -> Option<String> {
    window()?
        .location()
        .hash()
        .ok()
        .filter(|hash| !hash.is_empty())
}

fn listen_window<F>(event: &'static str, mut handler: F) -> Option<EventListener>
where
    F: FnMut() + 'static,
{
    let Some(win) = window() else {
        log_degraded(&format!("no window, not listening for {event}"));
        return None;
    };

    Some(EventListener::new(&win, event, move |_| handler()))
}

#[hook]
fn use_scroll_state() -> ScrollState {
    let state = use_state_eq(ScrollState::default);

    {
        let state = state.clone();
        use_effect_with((), move |_| {
            state.set(sample_scroll());

            let on_scroll = {
                let state = state.clone();
                listen_window("scroll", move || state.set(sample_scroll()))
            };
            let on_resize = listen_window("resize", move || state.set(sample_scroll()));

            move || {
                drop(on_scroll);
                drop(on_resize);
            }
        });
    }

    *state
}

struct ObservedEntry {
    target_id: String,
    is_intersecting: bool,
    ratio: f64,
}

impl ObservedEntry {
    fn from_js(value: JsValue) -> Option<Self> {
        let entry = value.dyn_into::<IntersectionObserverEntry>().ok()?;
        Some(Self {
            target_id: entry.target().id(),
            is_intersecting: entry.is_intersecting(),
            ratio: entry.intersection_ratio(),
        })
    }

    fn as_intersection(&self) -> Intersection<'_> {
        Intersection {
            target_id: &self.target_id,
            is_intersecting: self.is_intersecting,
            ratio: self.ratio,
        }
    }
}

#[derive(Clone, PartialEq)]
struct FocusState {
    focus: SectionFocus,
    reveal: RevealSet,
}

impl FocusState {
    fn initial() -> Self {
        Self {
            focus: SectionFocus::seeded(current_fragment().as_deref()),
            reveal: if prefers_reduced_motion() {
                RevealSet::all()
            } else {
                RevealSet::default()
            },
        }
    }
}

enum FocusAction {
    Observed(Vec<ObservedEntry>),
    Navigate(Section),
    RevealAll,
}

impl Reducible for FocusState {
    type Action = FocusAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        let changed = match action {
            FocusAction::Observed(entries) => {
                let focused = next
                    .focus
                    .observe_batch(entries.iter().map(ObservedEntry::as_intersection));
                let revealed = next
                    .reveal
                    .observe_batch(entries.iter().map(ObservedEntry::as_intersection));
                focused || revealed
            }
            FocusAction::Navigate(section) => next.focus.navigate(section),
            FocusAction::RevealAll => next.reveal.reveal_all(),
        };

        if changed {
            Rc::new(next)
        } else {
            self
        }
    }
}

struct SectionObserver {
    observer: IntersectionObserver,
    attached: ObservationSet,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl SectionObserver {
    fn connect(dispatcher: UseReducerDispatcher<FocusState>) -> Option<Self> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let batch: Vec<ObservedEntry> =
                    entries.iter().filter_map(ObservedEntry::from_js).collect();
                if !batch.is_empty() {
                    dispatcher.dispatch(FocusAction::Observed(batch));
                }
            },
        );

        // 0.0 feeds the entrance reveal, the focus threshold feeds the navbar.
        let thresholds = Array::of2(
            &JsValue::from_f64(0.0),
            &JsValue::from_f64(INTERSECTION_THRESHOLD),
        );
        let options = IntersectionObserverInit::new();
        options.set_threshold(&thresholds);

        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            {
                Ok(observer) => observer,
                Err(_) => {
                    log_degraded("IntersectionObserver unavailable, section focus disabled");
                    return None;
                }
            };

        Some(Self {
            observer,
            attached: ObservationSet::default(),
            _callback: callback,
        })
    }

    fn attach_ready(&mut self, anchors: &[NodeRef]) {
        if self.attached.is_complete() {
            return;
        }

        let ready = self
            .attached
            .attach_ready(|section| anchors[section.index()].get().is_some());

        for section in ready {
            if let Some(element) = anchors[section.index()].cast::<Element>() {
                self.observer.observe(&element);
            }
        }
    }
}

impl Drop for SectionObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
        self.attached.clear();
    }
}

#[derive(Properties, PartialEq)]
struct ExternalLinkProps {
    href: AttrValue,
    label: AttrValue,
    #[prop_or_default]
    class: Classes,
}

#[function_component(ExternalLink)]
fn external_link(props: &ExternalLinkProps) -> Html {
    html! {
        <a
            class={classes!("link", props.class.clone())}
            href={props.href.clone()}
            target="_blank"
            rel="noopener noreferrer"
        >
            {props.label.clone()}
            <span class="sr-only">{" (opens in a new tab)"}</span>
        </a>
    }
}

#[derive(Properties, PartialEq)]
struct NavLinkProps {
    section: Section,
    active: bool,
    on_navigate: Callback<Section>,
}

#[function_component(NavLink)]
fn nav_link(props: &NavLinkProps) -> Html {
    let onclick = {
        let section = props.section;
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |_: MouseEvent| on_navigate.emit(section))
    };

    html! {
        <a
            href={props.section.href()}
            class={classes!("nav-link", props.active.then_some("is-active"))}
            aria-current={props.active.then_some("location")}
            onclick={onclick}
        >
            <span aria-hidden="true">{props.section.icon()}</span>
            <span>{props.section.label()}</span>
            <span class="nav-underline" aria-hidden="true"></span>
        </a>
    }
}

#[derive(Properties, PartialEq)]
struct NavbarProps {
    active: Section,
    has_shadow: bool,
    is_open: bool,
    theme: Theme,
    on_navigate: Callback<Section>,
    on_toggle_menu: Callback<()>,
    on_toggle_theme: Callback<()>,
}

#[function_component(Navbar)]
fn navbar(props: &NavbarProps) -> Html {
    let links = || -> Html {
        Section::ALL
            .into_iter()
            .map(|section| {
                html! {
                    <li class="nav-item" key={section.id()}>
                        <NavLink
                            section={section}
                            active={props.active == section}
                            on_navigate={props.on_navigate.clone()}
                        />
                    </li>
                }
            })
            .collect()
    };

    let on_toggle_menu = {
        let on_toggle_menu = props.on_toggle_menu.clone();
        Callback::from(move |_: MouseEvent| on_toggle_menu.emit(()))
    };

    let on_toggle_theme = {
        let on_toggle_theme = props.on_toggle_theme.clone();
        Callback::from(move |_: MouseEvent| on_toggle_theme.emit(()))
    };

    html! {
        <nav class={classes!("navbar", props.has_shadow.then_some("has-shadow"))}>
            <div class="navbar-inner">
                <a class="brand" href={Section::Home.href()}>{"BAYU REZ"}</a>

                <ul class="nav-links desktop-only">{links()}</ul>

                <div class="nav-actions desktop-only">
                    <ExternalLink href={LINKEDIN_URL} label="LinkedIn" class={classes!("nav-icon")} />
                    <ExternalLink href={GITHUB_URL} label="GitHub" class={classes!("nav-icon")} />
                    <button
                        class="theme-toggle"
                        type="button"
                        aria-label={props.theme.toggle_label()}
                        aria-pressed={props.theme.pressed().to_string()}
                        onclick={on_toggle_theme.clone()}
                    >
                        <span aria-hidden="true">{props.theme.icon()}</span>
                    </button>
                </div>

                <button
                    class="menu-toggle mobile-only"
                    type="button"
                    aria-label="Toggle navigation menu"
                    aria-expanded={props.is_open.to_string()}
                    aria-controls="mobile-menu"
                    onclick={on_toggle_menu}
                >
                    <span aria-hidden="true">{if props.is_open { "✕" } else { "☰" }}</span>
                </button>
            </div>

            <div
                id="mobile-menu"
                class={classes!("mobile-menu", props.is_open.then_some("is-open"))}
            >
                <ul class="nav-links">{links()}</ul>
                <button
                    class="theme-toggle"
                    type="button"
                    aria-label={props.theme.toggle_label()}
                    aria-pressed={props.theme.pressed().to_string()}
                    onclick={on_toggle_theme}
                >
                    <span aria-hidden="true">{props.theme.icon()}</span>
                </button>
            </div>
        </nav>
    }
}

#[derive(Properties, PartialEq)]
struct ScrollToTopProps {
    scroll: ScrollState,
}

#[function_component(ScrollToTop)]
fn scroll_to_top_button(props: &ScrollToTopProps) -> Html {
    if !props.scroll.show_scroll_to_top() {
        return html! {};
    }

    let ring_style = format!("background: {};", props.scroll.progress_gradient(PROGRESS_FILL));
    let onclick = Callback::from(|_: MouseEvent| scroll_to_top());

    html! {
        <div class="scroll-top">
            <div class="scroll-top-ring" style={ring_style}>
                <button
                    class="scroll-top-button"
                    type="button"
                    aria-label="Scroll to top"
                    onclick={onclick}
                >
                    <span aria-hidden="true">{"🚀"}</span>
                </button>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct PageSectionProps {
    section: Section,
    anchor: NodeRef,
    revealed: bool,
    #[prop_or_default]
    children: Html,
}

#[function_component(PageSection)]
fn page_section(props: &PageSectionProps) -> Html {
    let heading_id = format!("{}-heading", props.section.id());

    html! {
        <section
            id={props.section.id()}
            ref={props.anchor.clone()}
            class={classes!("page-section", "reveal", props.revealed.then_some("is-revealed"))}
            aria-labelledby={heading_id.clone()}
        >
            <h2 id={heading_id}>
                <span aria-hidden="true">{props.section.icon()}{" "}</span>
                {props.section.label()}
            </h2>
            {props.children.clone()}
        </section>
    }
}

#[function_component(App)]
fn app() -> Html {
    let preference = use_mut_ref(|| DarkModePreference::new(WebPreferenceHost::animated()));
    let theme = {
        let preference = preference.clone();
        use_state(move || preference.borrow_mut().theme())
    };
    let is_open = use_state_eq(|| false);
    let scroll = use_scroll_state();
    let focus = use_reducer_eq(FocusState::initial);
    let anchors = use_memo((), |_| Section::ALL.map(|_| NodeRef::default()));
    let observer = use_mut_ref(|| None::<SectionObserver>);

    {
        let observer = observer.clone();
        let dispatcher = focus.dispatcher();
        use_effect_with((), move |_| {
            let connected = SectionObserver::connect(dispatcher.clone());
            if connected.is_none() {
                dispatcher.dispatch(FocusAction::RevealAll);
            }
            *observer.borrow_mut() = connected;

            let on_hash_change = listen_window("hashchange", move || {
                if let Some(section) = current_fragment().as_deref().and_then(Section::from_fragment)
                {
                    dispatcher.dispatch(FocusAction::Navigate(section));
                }
            });

            move || {
                drop(on_hash_change);
                observer.borrow_mut().take();
            }
        });
    }

    {
        let observer = observer.clone();
        let anchors = anchors.clone();
        use_effect(move || {
            if let Some(observer) = observer.borrow_mut().as_mut() {
                observer.attach_ready(anchors.as_slice());
            }
            || ()
        });
    }

    let on_toggle_theme = {
        let preference = preference.clone();
        let theme = theme.clone();
        Callback::from(move |_| {
            let dark = preference.borrow_mut().toggle();
            theme.set(Theme::from_dark(dark));
        })
    };

    let on_toggle_menu = {
        let is_open = is_open.clone();
        Callback::from(move |_| is_open.set(!*is_open))
    };

    let on_navigate = {
        let is_open = is_open.clone();
        let dispatcher = focus.dispatcher();
        Callback::from(move |section: Section| {
            is_open.set(false);
            dispatcher.dispatch(FocusAction::Navigate(section));
        })
    };

    let render_section = |section: Section, body: Html| -> Html {
        html! {
            <PageSection
                section={section}
                anchor={anchors[section.index()].clone()}
                revealed={focus.reveal.is_revealed(section)}
            >
                {body}
            </PageSection>
        }
    };

    html! {
        <>
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <Navbar
                active={focus.focus.active()}
                has_shadow={scroll.nav_has_shadow()}
                is_open={*is_open}
                theme={*theme}
                on_navigate={on_navigate}
                on_toggle_menu={on_toggle_menu}
                on_toggle_theme={on_toggle_theme}
            />
            <main id="content">
                {render_section(Section::Home, html! {
                    <>
                        <img class="avatar" src="/egg.png" alt="Portrait" width="150" height="150" />
                        <p class="hero-name">{"Nur Azani Bayu "}<span class="accent">{"Rezki."}</span></p>
                        <p class="muted">{"Web Developer & UI/UX Enthusiast"}</p>
                        <p>
                            {"I am a "}<b>{"Fullstack Developer"}</b>
                            {" from Indonesia with a strong grounding in programming languages and hands-on "}
                            <b>{"web development"}</b>{" projects."}
                        </p>
                        <div class="hero-actions">
                            <a class="button primary" href={Section::Resume.href()}>{"My Resume"}</a>
                            <a class="button" href={Section::About.href()}>{"See More About Me"}</a>
                        </div>
                    </>
                })}
                {render_section(Section::About, html! {
                    <>
                        <p class="lead">{"Hi, I'm Nur Azani Bayu Rezki 👋"}</p>
                        <p class="muted">
                            {"I turn ideas into interactive, dynamic websites. With a foundation in "}
                            <b>{"Laravel, JavaScript"}</b>{" and "}<b>{"Next.js"}</b>
                            {", I build responsive web applications that put user experience and performance first."}
                        </p>
                    </>
                })}
                {render_section(Section::Education, html! {
                    <p>{"Educational background."}</p>
                })}
                {render_section(Section::Project, html! {
                    <p>{"Selected projects."}</p>
                })}
                {render_section(Section::Resume, html! {
                    <p><a class="link" href="/resume.pdf">{"Download resume (PDF)"}</a></p>
                })}
                {render_section(Section::Contact, html! {
                    <ul class="row-list">
                        <li><ExternalLink href={LINKEDIN_URL} label="LinkedIn" /></li>
                        <li><ExternalLink href={GITHUB_URL} label="GitHub" /></li>
                    </ul>
                })}
            </main>
            <ScrollToTop scroll={scroll} />
        </>
    }
}

pub fn run() {
    console_error_panic_hook::set_once();

    DarkModePreference::new(WebPreferenceHost::immediate()).apply_initial();

    match window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("app"))
    {
        Some(root) => yew::Renderer::<App>::with_root(root).render(),
        None => {
            log_degraded("missing #app mount point, rendering into <body>");
            yew::Renderer::<App>::new().render()
        }
    };
}
