//! # Location Module
//!
//! Conversation locations (screens) and the handler chains that move a user
//! between them.
//!
//! Locations live in a [`Locations`] arena and are addressed by [`LocationId`].
//! There are three kinds:
//!
//! - plain locations, which only carry a welcome payload
//! - menus, which turn their children into reply-keyboard buttons
//! - func locations, which run a text transform on free input and redirect
//!
//! Every "add a button" operation on a menu appends one [`Handler`] to the
//! menu's [`HandlerChain`]. At runtime handlers are tried in registration
//! order and the first one that produces a transition wins, so a fallback
//! registered last only fires when nothing before it matched.
//!
//! Handling is transport-neutral: it returns a [`Response`] holding the
//! replies to send and the next state. The bot layer does the sending.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::dialogue::SessionState;

pub const DEFAULT_MENU_WELCOME: &str = "Choose the menu";
pub const DEFAULT_FUNC_WELCOME: &str = "Input the data";
pub const RETRY_NOTICE: &str = "Something went wrong. Try again.";
pub const UNDEFINED_HANDLER: &str = "Undefined handler";
pub const SOON_SUFFIX: &str = " (soon)";
pub const DEFAULT_BACK_PREFIX: &str = "Back to ";
pub const BUTTONS_PER_ROW: usize = 3;

/// Arena index of a location. Used as the state key of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub usize);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Text with an optional image, sent when a user enters a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub text: String,
    pub image_path: Option<PathBuf>,
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_path: None,
        }
    }

    pub fn with_image(text: impl Into<String>, image_path: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            image_path: Some(image_path.into()),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::text(text)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::text(text)
    }
}

/// Reply keyboard attached to a location's welcome message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Keyboard {
    /// Ask the client to hide any custom keyboard
    #[default]
    Remove,
    /// Rows of button labels
    Layout(Vec<Vec<String>>),
}

impl Keyboard {
    pub fn rows(&self) -> &[Vec<String>] {
        match self {
            Keyboard::Remove => &[],
            Keyboard::Layout(rows) => rows,
        }
    }
}

/// Split labels into keyboard rows of at most `per_row` buttons
pub fn button_layout(labels: &[String], per_row: usize) -> Vec<Vec<String>> {
    labels
        .chunks(per_row.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// One outbound unit produced by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text {
        text: String,
        /// `None` leaves whatever keyboard the client currently shows
        keyboard: Option<Keyboard>,
        html: bool,
    },
    Photo {
        path: PathBuf,
        caption: Option<String>,
        keyboard: Option<Keyboard>,
    },
}

impl Reply {
    /// Plain text without markup and without touching the keyboard
    pub fn plain(text: impl Into<String>) -> Self {
        Reply::Text {
            text: text.into(),
            keyboard: None,
            html: false,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Text { text, .. } => Some(text),
            Reply::Photo { caption, .. } => caption.as_deref(),
        }
    }
}

/// Where the conversation goes after an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No handler accepted the message
    Unhandled,
    /// Handled, but the current state is kept
    Stay,
    To(LocationId),
}

/// Outcome of feeding one inbound message to a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub replies: Vec<Reply>,
    pub transition: Transition,
}

impl Response {
    pub fn unhandled() -> Self {
        Self {
            replies: Vec::new(),
            transition: Transition::Unhandled,
        }
    }

    pub fn is_handled(&self) -> bool {
        self.transition != Transition::Unhandled
    }

    pub fn next_location(&self) -> Option<LocationId> {
        match self.transition {
            Transition::To(id) => Some(id),
            _ => None,
        }
    }
}

pub type TextFunc = Arc<dyn Fn(&str) -> anyhow::Result<String> + Send + Sync>;
pub type Supplier = Arc<dyn Fn() -> Option<LocationId> + Send + Sync>;
pub type SessionSupplier = Arc<dyn Fn(&mut SessionState) -> Option<LocationId> + Send + Sync>;

/// Picks the target of a function button at runtime
#[derive(Clone)]
pub enum NextLocation {
    Fixed(Supplier),
    WithSession(SessionSupplier),
}

impl NextLocation {
    fn resolve(&self, session: &mut SessionState) -> Option<LocationId> {
        match self {
            NextLocation::Fixed(supplier) => supplier(),
            NextLocation::WithSession(supplier) => supplier(session),
        }
    }
}

/// A single entry of a handler chain
#[derive(Clone)]
pub enum Handler {
    /// Button per child, label → child
    Children(Vec<(String, LocationId)>),
    /// Back navigation, label → target
    Back(Vec<(String, LocationId)>),
    Func { label: String, next: NextLocation },
    Info { label: String, text: String },
    /// Catch-all, `None` target means the owning location
    Fallback { target: Option<LocationId>, notice: String },
    Leaf {
        func: Option<TextFunc>,
        error: Payload,
        redirect: Option<LocationId>,
    },
}

impl Handler {
    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Children(_) => "children",
            Handler::Back(_) => "back",
            Handler::Func { .. } => "func",
            Handler::Info { .. } => "info",
            Handler::Fallback { .. } => "fallback",
            Handler::Leaf { .. } => "leaf",
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Children(buttons) => f.debug_tuple("Children").field(buttons).finish(),
            Handler::Back(buttons) => f.debug_tuple("Back").field(buttons).finish(),
            Handler::Func { label, .. } => f.debug_struct("Func").field("label", label).finish(),
            Handler::Info { label, .. } => f.debug_struct("Info").field("label", label).finish(),
            Handler::Fallback { target, .. } => {
                f.debug_struct("Fallback").field("target", target).finish()
            }
            Handler::Leaf { redirect, .. } => {
                f.debug_struct("Leaf").field("redirect", redirect).finish()
            }
        }
    }
}

/// Pre-filter applied to inbound input before any handler runs
#[derive(Debug, Clone, Default)]
pub enum InputFilter {
    #[default]
    Nothing,
    /// Union of exact label patterns
    Labels(Regex),
    Any,
}

impl InputFilter {
    pub fn for_labels(labels: &[String]) -> Self {
        if labels.is_empty() {
            return InputFilter::Nothing;
        }

        let union = labels
            .iter()
            .map(|label| regex::escape(label))
            .collect::<Vec<_>>()
            .join("|");
        match Regex::new(&format!("^(?:{union})$")) {
            Ok(pattern) => InputFilter::Labels(pattern),
            Err(e) => {
                error!(error = %e, "Failed to compile button filter");
                InputFilter::Nothing
            }
        }
    }

    pub fn accepts(&self, input: Option<&str>) -> bool {
        match self {
            InputFilter::Nothing => false,
            InputFilter::Labels(pattern) => input.is_some_and(|text| pattern.is_match(text)),
            InputFilter::Any => true,
        }
    }
}

/// Filter plus ordered handlers of one location
#[derive(Debug, Clone, Default)]
pub struct HandlerChain {
    pub filter: InputFilter,
    pub handlers: Vec<Handler>,
}

impl HandlerChain {
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

/// Kind-specific data of a location
#[derive(Clone)]
pub enum LocationKind {
    Plain,
    Menu {
        children: Vec<LocationId>,
        /// Every label the menu currently reacts to, in registration order
        labels: Vec<String>,
    },
    Func {
        func: Option<TextFunc>,
        error: Payload,
        redirect: Option<LocationId>,
    },
}

/// A conversational state
#[derive(Clone)]
pub struct Location {
    id: LocationId,
    name: String,
    welcome: Payload,
    keyboard: Keyboard,
    is_implemented: bool,
    send_photo_separately: bool,
    chain: HandlerChain,
    kind: LocationKind,
}

impl Location {
    pub fn id(&self) -> LocationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn welcome(&self) -> &Payload {
        &self.welcome
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn is_implemented(&self) -> bool {
        self.is_implemented
    }

    pub fn send_photo_separately(&self) -> bool {
        self.send_photo_separately
    }

    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.chain.handlers
    }

    pub fn is_menu(&self) -> bool {
        matches!(self.kind, LocationKind::Menu { .. })
    }

    pub fn children(&self) -> &[LocationId] {
        match &self.kind {
            LocationKind::Menu { children, .. } => children,
            _ => &[],
        }
    }

    /// Labels a menu reacts to; empty for other kinds
    pub fn labels(&self) -> &[String] {
        match &self.kind {
            LocationKind::Menu { labels, .. } => labels,
            _ => &[],
        }
    }

    pub fn redirect(&self) -> Option<LocationId> {
        match &self.kind {
            LocationKind::Func { redirect, .. } => *redirect,
            _ => None,
        }
    }

    /// Replies that greet a user entering this location
    pub fn send_welcome(&self) -> Vec<Reply> {
        let keyboard = Some(self.keyboard.clone());
        match &self.welcome.image_path {
            None => vec![Reply::Text {
                text: self.welcome.text.clone(),
                keyboard,
                html: true,
            }],
            Some(path) if self.send_photo_separately => vec![
                Reply::Photo {
                    path: path.clone(),
                    caption: None,
                    keyboard: None,
                },
                Reply::Text {
                    text: self.welcome.text.clone(),
                    keyboard,
                    html: true,
                },
            ],
            Some(path) => vec![Reply::Photo {
                path: path.clone(),
                caption: Some(self.welcome.text.clone()),
                keyboard,
            }],
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location \"{}\"", self.name)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("is_implemented", &self.is_implemented)
            .field("handlers", &self.chain.handlers)
            .finish()
    }
}

/// Mapping from state to the handler chain active in that state
pub type StateTable = std::collections::BTreeMap<LocationId, HandlerChain>;

/// Arena owning every location of a conversation tree
#[derive(Clone, Default)]
pub struct Locations {
    nodes: Vec<Location>,
}

impl Locations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.nodes.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.nodes.iter()
    }

    fn push(
        &mut self,
        name: String,
        welcome: Payload,
        is_implemented: bool,
        kind: LocationKind,
    ) -> LocationId {
        let id = LocationId(self.nodes.len());
        self.nodes.push(Location {
            id,
            name,
            welcome,
            keyboard: Keyboard::Remove,
            is_implemented,
            send_photo_separately: false,
            chain: HandlerChain::default(),
            kind,
        });
        id
    }

    /// Plain location with a fixed handler list
    pub fn add_location(
        &mut self,
        name: impl Into<String>,
        welcome: impl Into<Payload>,
        handlers: Vec<Handler>,
    ) -> LocationId {
        let id = self.push(name.into(), welcome.into(), true, LocationKind::Plain);
        if !handlers.is_empty() {
            self.nodes[id.0].chain = HandlerChain {
                filter: InputFilter::Any,
                handlers,
            };
        }
        id
    }

    /// Menus start unimplemented until children or buttons are attached
    pub fn add_menu(&mut self, name: impl Into<String>, welcome: impl Into<Payload>) -> LocationId {
        self.push(
            name.into(),
            welcome.into(),
            false,
            LocationKind::Menu {
                children: Vec::new(),
                labels: Vec::new(),
            },
        )
    }

    pub fn add_func(
        &mut self,
        name: impl Into<String>,
        welcome: impl Into<Payload>,
        func: Option<TextFunc>,
    ) -> LocationId {
        self.push(
            name.into(),
            welcome.into(),
            true,
            LocationKind::Func {
                func,
                error: Payload::text(RETRY_NOTICE),
                redirect: None,
            },
        )
    }

    pub fn set_send_photo_separately(&mut self, id: LocationId, separately: bool) {
        if let Some(location) = self.nodes.get_mut(id.0) {
            location.send_photo_separately = separately;
        }
    }

    pub fn set_implemented(&mut self, id: LocationId, implemented: bool) {
        if let Some(location) = self.nodes.get_mut(id.0) {
            location.is_implemented = implemented;
        }
    }

    /// Replies greeting a user entering `id`
    pub fn send_welcome(&self, id: LocationId) -> Vec<Reply> {
        match self.get(id) {
            Some(location) => location.send_welcome(),
            None => {
                error!(location = %id, "Welcome requested for unknown location");
                Vec::new()
            }
        }
    }

    fn menu_mut(&mut self, id: LocationId, operation: &str) -> Option<&mut Location> {
        match self.nodes.get_mut(id.0) {
            Some(location) if location.is_menu() => Some(location),
            Some(location) => {
                error!(
                    location = %location,
                    operation,
                    "Button operation on a location that is not a menu"
                );
                None
            }
            None => {
                error!(location = %id, operation, "Button operation on unknown location");
                None
            }
        }
    }

    fn any_implemented(&self, ids: &[LocationId]) -> bool {
        ids.iter()
            .filter_map(|id| self.get(*id))
            .any(Location::is_implemented)
    }

    fn names_of(&self, ids: &[LocationId]) -> Vec<String> {
        ids.iter()
            .map(|id| self.get(*id).map(|l| l.name.clone()).unwrap_or_default())
            .collect()
    }

    /// Attach children as buttons, replacing any previous handlers.
    ///
    /// Labels default to the children's names. Unimplemented children get a
    /// `" (soon)"` suffix which becomes part of the matched label.
    pub fn add_children_buttons(
        &mut self,
        menu: LocationId,
        children: &[LocationId],
        labels: Option<&[&str]>,
    ) {
        let implemented = self.any_implemented(children);
        let names: Vec<String> = match labels {
            Some(labels) => labels.iter().map(|l| l.to_string()).collect(),
            None => self.names_of(children),
        };
        if names.len() != children.len() {
            warn!(
                location = %menu,
                labels = names.len(),
                children = children.len(),
                "Label count differs from child count, extra entries are ignored"
            );
        }

        let mut buttons = Vec::new();
        for (child, name) in children.iter().zip(names) {
            let mut label = name;
            if !self.get(*child).is_some_and(Location::is_implemented) {
                info!(button = %label, "Child is not implemented");
                label.push_str(SOON_SUFFIX);
            }
            buttons.push((label, *child));
        }

        let Some(location) = self.menu_mut(menu, "add_children_buttons") else {
            return;
        };
        location.is_implemented = implemented;
        if !implemented {
            info!(location = %location, "Menu is not implemented");
        }

        let new_labels: Vec<String> = buttons.iter().map(|(label, _)| label.clone()).collect();
        info!(location = %location, buttons = ?new_labels, "Menu has children buttons");
        location.keyboard = Keyboard::Layout(button_layout(&new_labels, BUTTONS_PER_ROW));
        location.chain = HandlerChain {
            filter: InputFilter::for_labels(&new_labels),
            handlers: vec![Handler::Children(buttons)],
        };
        location.kind = LocationKind::Menu {
            children: children.to_vec(),
            labels: new_labels,
        };
    }

    /// Add one row of `"{prefix}{target name}"` buttons leading back to `targets`
    pub fn add_back_buttons(&mut self, menu: LocationId, targets: &[LocationId], prefix: &str) {
        let mut unique = Vec::new();
        for target in targets {
            if !unique.contains(target) {
                unique.push(*target);
            }
        }
        let buttons: Vec<(String, LocationId)> = self
            .names_of(&unique)
            .into_iter()
            .map(|name| format!("{prefix}{name}"))
            .zip(unique)
            .collect();

        let Some(location) = self.menu_mut(menu, "add_back_buttons") else {
            return;
        };
        if location.chain.is_empty() {
            error!(location = %location, "Back buttons added before children buttons");
            return;
        }

        let row: Vec<String> = buttons.iter().map(|(label, _)| label.clone()).collect();
        location.append_row(row);
        location.chain.handlers.push(Handler::Back(buttons));
    }

    /// Add a button whose target is chosen by `supplier` when pressed
    pub fn add_func_button(
        &mut self,
        menu: LocationId,
        label: &str,
        supplier: Supplier,
        children: &[LocationId],
    ) {
        self.attach_func_button(menu, label, NextLocation::Fixed(supplier), children);
    }

    /// Like [`Locations::add_func_button`], but the supplier sees the session
    pub fn add_func_button_with_session(
        &mut self,
        menu: LocationId,
        label: &str,
        supplier: SessionSupplier,
        children: &[LocationId],
    ) {
        self.attach_func_button(menu, label, NextLocation::WithSession(supplier), children);
    }

    fn attach_func_button(
        &mut self,
        menu: LocationId,
        label: &str,
        next: NextLocation,
        children: &[LocationId],
    ) {
        let implemented = self.any_implemented(children);
        let Some(location) = self.menu_mut(menu, "add_func_button") else {
            return;
        };
        location.is_implemented = implemented;
        if !implemented {
            debug!(location = %location, "Menu is not implemented");
        }
        if let LocationKind::Menu { children: existing, .. } = &mut location.kind {
            for child in children {
                if !existing.contains(child) {
                    existing.push(*child);
                }
            }
        }

        location.append_row(vec![label.to_string()]);
        location.chain.handlers.push(Handler::Func {
            label: label.to_string(),
            next,
        });
        info!(location = %location, button = label, "Menu has func button");
    }

    /// Add a button answering with `info_text` while staying on the menu
    pub fn add_info_button(&mut self, menu: LocationId, label: &str, info_text: &str) {
        let Some(location) = self.menu_mut(menu, "add_info_button") else {
            return;
        };
        if location.chain.is_empty() {
            error!(location = %location, "Info button added before another buttons");
            return;
        }
        location.is_implemented = true;
        location.append_row(vec![label.to_string()]);
        location.chain.handlers.push(Handler::Info {
            label: label.to_string(),
            text: info_text.to_string(),
        });
        info!(location = %location, button = label, "Menu has info button");
    }

    /// Catch everything the earlier handlers left unhandled
    pub fn add_fallback(&mut self, menu: LocationId, target: Option<LocationId>) {
        self.add_fallback_with_notice(menu, target, RETRY_NOTICE);
    }

    pub fn add_fallback_with_notice(
        &mut self,
        menu: LocationId,
        target: Option<LocationId>,
        notice: &str,
    ) {
        let Some(location) = self.menu_mut(menu, "add_fallback") else {
            return;
        };
        if location.chain.is_empty() {
            error!(location = %location, "Fallback added before another buttons");
            return;
        }
        location.chain.filter = InputFilter::Any;
        location.chain.handlers.push(Handler::Fallback {
            target,
            notice: notice.to_string(),
        });
    }

    pub fn set_redirect(&mut self, func: LocationId, target: LocationId) {
        let target_name = self.get(target).map(ToString::to_string);
        let Some(location) = self.nodes.get_mut(func.0) else {
            error!(location = %func, "Redirect set on unknown location");
            return;
        };
        let source_name = location.to_string();
        match &mut location.kind {
            LocationKind::Func { redirect, .. } => {
                info!(
                    from = %source_name,
                    to = target_name.as_deref().unwrap_or("unknown"),
                    "Set redirect"
                );
                *redirect = Some(target);
            }
            _ => error!(
                location = %source_name,
                "Redirect set on a location that is not a func location"
            ),
        }
    }

    pub fn set_error_message(&mut self, func: LocationId, message: impl Into<Payload>) {
        if let Some(Location {
            kind: LocationKind::Func { error, .. },
            ..
        }) = self.nodes.get_mut(func.0)
        {
            *error = message.into();
        }
    }

    /// Build the leaf handler. Call after [`Locations::set_redirect`].
    pub fn prepare_handler(&mut self, func: LocationId) {
        let Some(location) = self.nodes.get_mut(func.0) else {
            error!(location = %func, "Handler requested for unknown location");
            return;
        };
        info!(location = %location, "Preparing handler");
        let handler = match &location.kind {
            LocationKind::Func { func, error, redirect } => {
                if redirect.is_none() {
                    error!(location = %location, "Redirect is not set");
                }
                Handler::Leaf {
                    func: func.clone(),
                    error: error.clone(),
                    redirect: *redirect,
                }
            }
            _ => {
                error!(
                    location = %location,
                    "Leaf handler requested for a location that is not a func location"
                );
                return;
            }
        };
        location.chain = HandlerChain {
            filter: InputFilter::Any,
            handlers: vec![handler],
        };
    }

    /// Insert `id` and, for menus, everything reachable through its children.
    ///
    /// Depth-first, pre-order, children in insertion order. A location
    /// already present is skipped together with its subtree.
    pub fn register_into(&self, id: LocationId, states: &mut StateTable) {
        let Some(location) = self.get(id) else {
            error!(location = %id, "Cannot register unknown location");
            return;
        };
        if states.contains_key(&id) {
            return;
        }
        states.insert(id, location.chain.clone());
        for child in location.children() {
            self.register_into(*child, states);
        }
    }

    /// Feed one inbound message to the location's own chain
    pub fn handle(
        &self,
        id: LocationId,
        input: Option<&str>,
        session: &mut SessionState,
    ) -> Response {
        match self.get(id) {
            Some(location) => self.handle_with(location.chain(), id, input, session),
            None => Response::unhandled(),
        }
    }

    /// Run `chain` as if it belonged to `current`
    pub fn handle_with(
        &self,
        chain: &HandlerChain,
        current: LocationId,
        input: Option<&str>,
        session: &mut SessionState,
    ) -> Response {
        if !chain.filter.accepts(input) {
            return Response::unhandled();
        }
        for handler in &chain.handlers {
            if let Some(response) = self.apply(handler, current, input, session) {
                return response;
            }
        }
        Response::unhandled()
    }

    fn enter(&self, target: LocationId) -> Response {
        Response {
            replies: self.send_welcome(target),
            transition: Transition::To(target),
        }
    }

    fn apply(
        &self,
        handler: &Handler,
        current: LocationId,
        input: Option<&str>,
        session: &mut SessionState,
    ) -> Option<Response> {
        match handler {
            Handler::Children(buttons) | Handler::Back(buttons) => {
                let text = input?;
                let (_, target) = buttons.iter().find(|(label, _)| label == text)?;
                debug!(from = %current, to = %target, kind = handler.kind(), "Button pressed");
                Some(self.enter(*target))
            }
            Handler::Func { label, next } => {
                if input? != label {
                    return None;
                }
                match next.resolve(session) {
                    Some(target) => {
                        debug!(
                            from = %current,
                            to = %target,
                            button = %label,
                            "Func button pressed"
                        );
                        Some(self.enter(target))
                    }
                    None => {
                        warn!(
                            location = %current,
                            button = %label,
                            "Func button produced no location"
                        );
                        None
                    }
                }
            }
            Handler::Info { label, text } => {
                if input? != label {
                    return None;
                }
                Some(Response {
                    replies: vec![Reply::plain(text.clone())],
                    transition: Transition::To(current),
                })
            }
            Handler::Fallback { target, notice } => {
                let target = target.unwrap_or(current);
                let mut replies = vec![Reply::plain(notice.clone())];
                replies.extend(self.send_welcome(target));
                Some(Response {
                    replies,
                    transition: Transition::To(target),
                })
            }
            Handler::Leaf { func, error, redirect } => {
                let text = input.unwrap_or_default();
                let reply = match func {
                    Some(func) => match func(text) {
                        Ok(output) => output,
                        Err(e) => {
                            error!(location = %current, error = %e, "Error in location handler");
                            error.text.clone()
                        }
                    },
                    None => UNDEFINED_HANDLER.to_string(),
                };
                let mut replies = vec![Reply::plain(reply)];
                let transition = match redirect {
                    Some(target) => {
                        replies.extend(self.send_welcome(*target));
                        Transition::To(*target)
                    }
                    None => Transition::Stay,
                };
                Some(Response { replies, transition })
            }
        }
    }
}

impl Location {
    fn append_row(&mut self, row: Vec<String>) {
        let mut rows = self.keyboard.rows().to_vec();
        if let LocationKind::Menu { labels, .. } = &mut self.kind {
            labels.extend(row.iter().cloned());
            if !matches!(self.chain.filter, InputFilter::Any) {
                self.chain.filter = InputFilter::for_labels(labels);
            }
        }
        rows.push(row);
        self.keyboard = Keyboard::Layout(rows);
    }
}
