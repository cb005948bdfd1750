//! A bound MountMagic page.
//!
//! `Page::bind` finds every feature in the markup and records what should
//! happen for each (event, element) pair. Input arrives through
//! [`Page::dispatch`], time through [`Page::advance_to`]; anything the host
//! has to act on (notices, scrolling) is queued as an [`Effect`].

use std::collections::HashMap;

use log::{debug, error, info};

use crate::components::contact::{copy_failure_notice, Clipboard, CopyPhone};
use crate::components::media::{MediaRegistry, Playback};
use crate::components::modal::LogoModal;
use crate::components::nav::{anchor_scroll_top, HeaderShadow, NavMenu};
use crate::components::packages::{details_notice, render_cards, RenderedCard, PACKAGES};
use crate::components::reveal::{LazyImages, RevealOnScroll, REVEAL_SELECTOR};
use crate::components::rotator::Rotator;
use crate::components::utilities::{apply_image_fallback, view_all_notice};
use crate::components::visibility::VisibilityTracker;
use crate::config::SiteConfig;
use crate::dom::{DomTree, NodeId};
use crate::engine::timers::{PendingTimer, TimerId, TimerQueue};
use crate::error::SiteError;
use crate::viewport::Geometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    MouseEnter,
    MouseLeave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Click(NodeId),
    MouseEnter(NodeId),
    MouseLeave(NodeId),
    KeyDown(Key),
    /// Raw scroll signal carrying the new document offset.
    Scroll { scroll_y: f32 },
    Resize,
    /// An image failed to load.
    ImageError(NodeId),
    Load,
}

/// Something the host has to do on the page's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Alert-style message for the user.
    Notice(String),
    ScrollTo { top: f32, smooth: bool },
}

/// Timer payloads of the page clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    RotatorTick(usize),
    ScrollSettled,
    HideCopyFeedback,
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
    PrevSlide(usize),
    NextSlide(usize),
    GoToSlide { carousel: usize, index: usize },
    PauseCarousel(usize),
    ResumeCarousel(usize),
    TogglePlay(String),
    ToggleMenu,
    CloseMenu,
    ScrollToAnchor(String),
    OpenLogo,
    CloseLogo,
    /// Closes only when the overlay itself was clicked, not its content.
    CloseLogoOverlay,
    PackageDetails(usize),
    CopyPhone,
    ViewAll,
}

/// Collaborators the page borrows for one call.
pub struct Host<'a> {
    pub geometry: &'a dyn Geometry,
    pub playback: &'a mut dyn Playback,
    pub clipboard: &'a mut dyn Clipboard,
}

/// One hero carousel and the container that pauses it on hover.
#[derive(Debug, Clone)]
pub struct Carousel {
    pub rotator: Rotator,
    pub container: Option<NodeId>,
}

pub struct Page {
    tree: DomTree,
    config: SiteConfig,
    timers: TimerQueue<Task>,
    bindings: HashMap<(EventKind, NodeId), Vec<Action>>,
    carousels: Vec<Carousel>,
    media: MediaRegistry,
    tracker: VisibilityTracker,
    reveal: RevealOnScroll,
    lazy: Option<LazyImages>,
    nav: Option<NavMenu>,
    header: Option<HeaderShadow>,
    modal: Option<LogoModal>,
    packages: Vec<RenderedCard>,
    copy: Option<CopyPhone>,
    effects: Vec<Effect>,
    loaded: bool,
}

impl Page {
    /// Wire every feature found in `tree`. Features whose elements are
    /// missing are skipped; the rest still work.
    pub fn bind(tree: DomTree, config: SiteConfig, now_ms: u64) -> Result<Self, SiteError> {
        config.validate()?;

        let mut page = Page {
            tree,
            timers: TimerQueue::new(now_ms),
            bindings: HashMap::new(),
            carousels: Vec::new(),
            media: MediaRegistry::new(),
            tracker: VisibilityTracker::new(config.scroll_debounce_ms),
            reveal: RevealOnScroll::new(config.reveal_threshold, config.reveal_margin_px),
            lazy: None,
            nav: None,
            header: None,
            modal: None,
            packages: Vec::new(),
            copy: None,
            effects: Vec::new(),
            loaded: false,
            config,
        };

        // cards first so they are picked up by the reveal pass
        page.bind_packages()?;
        page.bind_carousels()?;
        page.bind_media()?;
        page.bind_nav()?;
        page.bind_modal();
        page.bind_contact()?;
        page.bind_reveal()?;

        debug!(
            "bound '{}': {} carousel(s), {} video(s), {} package card(s), {} bindings",
            page.tree.title,
            page.carousels.len(),
            page.media.len(),
            page.packages.len(),
            page.bindings.len()
        );
        Ok(page)
    }

    fn on(&mut self, kind: EventKind, node: NodeId, action: Action) {
        self.bindings.entry((kind, node)).or_default().push(action);
    }

    fn bind_packages(&mut self) -> Result<(), SiteError> {
        let Some(grid) = self.tree.element_by_id("packagesGrid") else {
            debug!("no #packagesGrid, packages not rendered");
            return Ok(());
        };
        self.packages = render_cards(&mut self.tree, grid, &PACKAGES, &self.config.placeholder_image);
        let buttons: Vec<_> = self.packages.iter().map(|c| c.details_button).collect();
        for (i, button) in buttons.into_iter().enumerate() {
            if let Some(button) = button {
                self.on(EventKind::Click, button, Action::PackageDetails(i));
            }
        }
        Ok(())
    }

    fn bind_carousels(&mut self) -> Result<(), SiteError> {
        let containers = self.tree.select(".hero")?;
        let scopes: Vec<(NodeId, Option<NodeId>)> = if containers.is_empty() {
            vec![(self.tree.root(), None)]
        } else {
            containers.into_iter().map(|c| (c, Some(c))).collect()
        };

        for (scope, container) in scopes {
            let slides = self.tree.select_within(scope, ".hero-slide")?;
            let indicators = self.tree.select_within(scope, ".indicator")?;
            let Some(mut rotator) = Rotator::new(slides, indicators, self.config.slide_interval_ms)
            else {
                debug!("hero without slides, carousel not created");
                continue;
            };
            let idx = self.carousels.len();
            rotator.show(0, &mut self.tree);
            rotator.start(&mut self.timers, Task::RotatorTick(idx));

            if let Some(prev) = self.tree.select_within(scope, "#prevBtn, .prev-btn")?.first() {
                self.on(EventKind::Click, *prev, Action::PrevSlide(idx));
            }
            if let Some(next) = self.tree.select_within(scope, "#nextBtn, .next-btn")?.first() {
                self.on(EventKind::Click, *next, Action::NextSlide(idx));
            }
            let dots: Vec<NodeId> = rotator.indicators().iter().take(rotator.len()).copied().collect();
            for (index, dot) in dots.into_iter().enumerate() {
                self.on(EventKind::Click, dot, Action::GoToSlide { carousel: idx, index });
            }
            if let Some(container) = container {
                self.on(EventKind::MouseEnter, container, Action::PauseCarousel(idx));
                self.on(EventKind::MouseLeave, container, Action::ResumeCarousel(idx));
            }
            self.carousels.push(Carousel { rotator, container });
        }
        Ok(())
    }

    fn bind_media(&mut self) -> Result<(), SiteError> {
        let videos = self.tree.select("video[data-video-id]")?;
        for button in self.tree.select(".play-btn[data-video-id]")? {
            let Some(id) = self.tree.attr(button, "data-video-id").map(str::to_string) else {
                continue;
            };
            let video = videos
                .iter()
                .copied()
                .find(|v| self.tree.attr(*v, "data-video-id") == Some(id.as_str()));
            let Some(video) = video else {
                debug!("play button for '{}' has no video", id);
                continue;
            };
            if self.media.register(&id, video, button) {
                self.on(EventKind::Click, button, Action::TogglePlay(id));
            } else {
                debug!("video '{}' already has a control", id);
            }
        }
        Ok(())
    }

    fn bind_nav(&mut self) -> Result<(), SiteError> {
        if let (Some(hamburger), Some(menu)) = (
            self.tree.element_by_id("hamburger"),
            self.tree.element_by_id("navMenu"),
        ) {
            self.nav = Some(NavMenu::new(hamburger, menu));
            self.on(EventKind::Click, hamburger, Action::ToggleMenu);
            for link in self.tree.select(".nav-link")? {
                self.on(EventKind::Click, link, Action::CloseMenu);
            }
        } else {
            debug!("no #hamburger/#navMenu, menu toggle not bound");
        }

        for anchor in self.tree.select(r##"a[href^="#"]"##)? {
            if let Some(href) = self.tree.attr(anchor, "href").map(str::to_string) {
                self.on(EventKind::Click, anchor, Action::ScrollToAnchor(href));
            }
        }

        self.header = self
            .tree
            .element_by_id("header")
            .map(|h| HeaderShadow::new(h, self.config.header_shadow_after_px));
        Ok(())
    }

    fn bind_modal(&mut self) {
        let (Some(logo), Some(modal), Some(image)) = (
            self.tree.element_by_id("logoImage"),
            self.tree.element_by_id("logoModal"),
            self.tree.element_by_id("logoModalImage"),
        ) else {
            debug!("logo modal elements missing, lightbox not bound");
            return;
        };
        let close_button = self.tree.element_by_id("logoModalClose");
        self.modal = Some(LogoModal {
            logo,
            modal,
            image,
            close_button,
        });
        self.on(EventKind::Click, logo, Action::OpenLogo);
        if let Some(close) = close_button {
            self.on(EventKind::Click, close, Action::CloseLogo);
        }
        self.on(EventKind::Click, modal, Action::CloseLogoOverlay);
    }

    fn bind_contact(&mut self) -> Result<(), SiteError> {
        if let (Some(button), Some(number)) = (
            self.tree.element_by_id("copyBtn"),
            self.tree.element_by_id("phoneNumber"),
        ) {
            let feedback = self.tree.element_by_id("copyFeedback");
            self.copy = Some(CopyPhone::new(button, number, feedback, self.config.copy_feedback_ms));
            self.on(EventKind::Click, button, Action::CopyPhone);
        } else {
            debug!("no #copyBtn/#phoneNumber, copy button not bound");
        }

        for button in self.tree.select(".view-all-btn")? {
            self.on(EventKind::Click, button, Action::ViewAll);
        }
        Ok(())
    }

    fn bind_reveal(&mut self) -> Result<(), SiteError> {
        for element in self.tree.select(REVEAL_SELECTOR)? {
            self.reveal.register(element, &mut self.tree);
        }
        if self.config.lazy_images {
            self.lazy = Some(LazyImages::new(self.tree.select("img[data-src]")?));
        }
        Ok(())
    }

    /// Feed one input event to the page.
    pub fn dispatch(&mut self, event: PageEvent, host: &mut Host<'_>) {
        match event {
            PageEvent::Click(target) => self.click(target, host),
            PageEvent::MouseEnter(node) => self.run_bound(EventKind::MouseEnter, node, node, host),
            PageEvent::MouseLeave(node) => self.run_bound(EventKind::MouseLeave, node, node, host),
            PageEvent::KeyDown(Key::Escape) => {
                if let Some(modal) = self.modal {
                    modal.close(&mut self.tree);
                }
            }
            PageEvent::KeyDown(Key::Other(_)) => {}
            PageEvent::Scroll { scroll_y } => {
                if let Some(header) = self.header {
                    header.apply(scroll_y, &mut self.tree);
                }
                self.observe_reveal(host.geometry);
                self.tracker.signal(&mut self.timers, Task::ScrollSettled);
            }
            PageEvent::Resize => {
                self.observe_reveal(host.geometry);
                self.tracker.signal(&mut self.timers, Task::ScrollSettled);
            }
            PageEvent::ImageError(node) => {
                if self.tree.node(node).is_some_and(|n| n.tag == "img") {
                    apply_image_fallback(&mut self.tree, node, &self.config.placeholder_image);
                }
            }
            PageEvent::Load => self.load(host),
        }
    }

    /// Clicks bubble from the target up through its ancestors.
    fn click(&mut self, target: NodeId, host: &mut Host<'_>) {
        let mut cur = Some(target);
        while let Some(node) = cur {
            self.run_bound(EventKind::Click, node, target, host);
            cur = self.tree.node(node).and_then(|n| n.parent);
        }
    }

    fn run_bound(&mut self, kind: EventKind, node: NodeId, target: NodeId, host: &mut Host<'_>) {
        let Some(actions) = self.bindings.get(&(kind, node)).cloned() else {
            return;
        };
        for action in actions {
            self.run(action, node, target, host);
        }
    }

    fn run(&mut self, action: Action, node: NodeId, target: NodeId, host: &mut Host<'_>) {
        match action {
            Action::PrevSlide(i) => self.navigate(i, |r, tree| {
                r.prev(tree);
            }),
            Action::NextSlide(i) => self.navigate(i, |r, tree| {
                r.next(tree);
            }),
            Action::GoToSlide { carousel, index } => self.navigate(carousel, |r, tree| {
                r.show(index as i64, tree);
            }),
            Action::PauseCarousel(i) => {
                if let Some(c) = self.carousels.get_mut(i) {
                    c.rotator.stop(&mut self.timers);
                }
            }
            Action::ResumeCarousel(i) => {
                if let Some(c) = self.carousels.get_mut(i) {
                    c.rotator.start(&mut self.timers, Task::RotatorTick(i));
                }
            }
            Action::TogglePlay(id) => {
                self.media.toggle_play(&id, &mut self.tree, host.playback);
            }
            Action::ToggleMenu => {
                if let Some(nav) = self.nav {
                    nav.toggle(&mut self.tree);
                }
            }
            Action::CloseMenu => {
                if let Some(nav) = self.nav {
                    nav.close(&mut self.tree);
                }
            }
            Action::ScrollToAnchor(href) => {
                if let Some(top) =
                    anchor_scroll_top(&self.tree, host.geometry, &href, self.config.header_offset_px)
                {
                    self.effects.push(Effect::ScrollTo { top, smooth: true });
                }
            }
            Action::OpenLogo => {
                if let Some(modal) = self.modal {
                    modal.open(&mut self.tree);
                }
            }
            Action::CloseLogo => {
                if let Some(modal) = self.modal {
                    modal.close(&mut self.tree);
                }
            }
            Action::CloseLogoOverlay => {
                if let Some(modal) = self.modal.filter(|_| node == target) {
                    modal.close(&mut self.tree);
                }
            }
            Action::PackageDetails(i) => {
                if let Some(card) = self.packages.get(i) {
                    self.effects.push(Effect::Notice(details_notice(&card.item)));
                }
            }
            Action::CopyPhone => self.copy_phone(host),
            Action::ViewAll => {
                let label = self.tree.text_content(node);
                if let Some(notice) = view_all_notice(&label) {
                    self.effects.push(Effect::Notice(notice.to_string()));
                }
            }
        }
    }

    /// Manual navigation restarts the timer so the next automatic advance
    /// is a full period away.
    fn navigate(&mut self, carousel: usize, step: impl FnOnce(&mut Rotator, &mut DomTree)) {
        let Some(c) = self.carousels.get_mut(carousel) else {
            return;
        };
        step(&mut c.rotator, &mut self.tree);
        c.rotator.restart(&mut self.timers, Task::RotatorTick(carousel));
    }

    fn copy_phone(&mut self, host: &mut Host<'_>) {
        let Some(copy) = self.copy.as_mut() else {
            return;
        };
        match copy.copy(&mut self.tree, host.clipboard, &mut self.timers, Task::HideCopyFeedback) {
            Ok(()) => debug!("phone number copied"),
            Err((number, e)) => {
                error!("failed to copy text: {}", e);
                self.effects.push(Effect::Notice(copy_failure_notice(&number)));
            }
        }
    }

    fn observe_reveal(&mut self, geometry: &dyn Geometry) {
        let revealed = self.reveal.observe(geometry, &mut self.tree);
        if !revealed.is_empty() {
            debug!("revealed {} element(s)", revealed.len());
        }
        if let Some(lazy) = self.lazy.as_mut() {
            let loaded = lazy.observe(geometry, &mut self.tree);
            if loaded > 0 {
                debug!("loaded {} lazy image(s)", loaded);
            }
        }
    }

    fn load(&mut self, host: &mut Host<'_>) {
        if let Some(header) = self.header {
            header.apply(host.geometry.scroll_y(), &mut self.tree);
        }
        self.observe_reveal(host.geometry);
        self.tracker
            .on_scroll_signal(&mut self.media, host.geometry, host.playback);

        if !self.loaded {
            self.loaded = true;
            info!("MountMagic page loaded: {}", self.tree.title);
            info!("video controls initialized ({} tracked)", self.media.len());
            info!(
                "image slider ready, auto-sliding every {} ms",
                self.config.slide_interval_ms
            );
            info!("{} packages loaded", self.packages.len());
            if self.modal.is_some() {
                info!("logo modal ready, click the logo to view it larger");
            }
        }
    }

    /// Run every timer due up to `now_ms`, in order.
    pub fn advance_to(&mut self, now_ms: u64, host: &mut Host<'_>) {
        while let Some((id, task)) = self.timers.pop_due(now_ms) {
            self.run_task(id, task, host);
        }
        self.timers.settle(now_ms);
    }

    fn run_task(&mut self, id: TimerId, task: Task, host: &mut Host<'_>) {
        match task {
            Task::RotatorTick(i) => {
                if let Some(c) = self.carousels.get_mut(i) {
                    if c.rotator.owns_timer(id) {
                        c.rotator.next(&mut self.tree);
                    }
                }
            }
            Task::ScrollSettled => {
                if self.tracker.settle(id) {
                    let paused = self
                        .tracker
                        .on_scroll_signal(&mut self.media, host.geometry, host.playback);
                    if paused > 0 {
                        debug!("scroll settled, paused {} video(s)", paused);
                    }
                }
            }
            Task::HideCopyFeedback => {
                if let Some(copy) = self.copy.as_mut() {
                    copy.hide_feedback(id, &mut self.tree);
                }
            }
        }
    }

    /// Drain the effects queued since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.timers.pending()
    }

    pub fn carousels(&self) -> &[Carousel] {
        &self.carousels
    }

    pub fn media(&self) -> &MediaRegistry {
        &self.media
    }

    pub fn reveal(&self) -> &RevealOnScroll {
        &self.reveal
    }

    pub fn packages(&self) -> &[RenderedCard] {
        &self.packages
    }

    pub fn nav(&self) -> Option<&NavMenu> {
        self.nav.as_ref()
    }

    pub fn modal(&self) -> Option<&LogoModal> {
        self.modal.as_ref()
    }

    pub fn copy_phone_button(&self) -> Option<&CopyPhone> {
        self.copy.as_ref()
    }

    /// Whether anything listens for `kind` on `node` itself.
    pub fn is_bound(&self, kind: EventKind, node: NodeId) -> bool {
        self.bindings.contains_key(&(kind, node))
    }
}
