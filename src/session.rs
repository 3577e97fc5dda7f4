// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! State owned by one interactive `shell` run. Caches are populated when a
//! view loads and cleared whenever the user navigates elsewhere.

use std::collections::VecDeque;
use std::fmt;

use crate::models::{Buyer, ChatMessage, PriceBoard, Sender};

pub const SEARCH_HISTORY_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Search,
    Buyers,
    Prices,
    Budget,
    Chat,
    Ai,
    Tasks,
    Sunat,
}

impl View {
    pub const ALL: [View; 9] = [
        View::Dashboard,
        View::Search,
        View::Buyers,
        View::Prices,
        View::Budget,
        View::Chat,
        View::Ai,
        View::Tasks,
        View::Sunat,
    ];

    pub fn parse(s: &str) -> Option<View> {
        View::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Search => "search",
            View::Buyers => "buyers",
            View::Prices => "prices",
            View::Budget => "budget",
            View::Chat => "chat",
            View::Ai => "ai",
            View::Tasks => "tasks",
            View::Sunat => "sunat",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Most recent first, bounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHistory {
    entries: VecDeque<String>,
}

impl SearchHistory {
    pub fn push(&mut self, search: impl Into<String>) {
        self.entries.push_front(search.into());
        self.entries.truncate(SEARCH_HISTORY_LEN);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Append-only transcript seeded with the assistant greeting.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

pub const CHAT_GREETING: &str =
    "Hi! I'm MINERAL-AGENT, your trading assistant. How can I help you today?";

impl Default for ChatLog {
    fn default() -> Self {
        let mut log = Self {
            messages: Vec::new(),
        };
        log.push(Sender::Bot, CHAT_GREETING);
        log
    }
}

impl ChatLog {
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> &ChatMessage {
        let id = self.messages.len() + 1;
        self.messages.push(ChatMessage {
            id,
            sender,
            text: text.into(),
        });
        &self.messages[id - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[derive(Debug, Default)]
pub struct Session {
    view: Option<View>,
    pub search_history: SearchHistory,
    pub buyers: Option<Vec<Buyer>>,
    pub prices: Option<PriceBoard>,
    pub chat: ChatLog,
}

impl Session {
    pub fn view(&self) -> Option<View> {
        self.view
    }

    /// Switches to `view`, dropping cached lists from the previous one.
    /// Search history and the chat transcript live for the whole session.
    pub fn navigate(&mut self, view: View) {
        if self.view != Some(view) {
            tracing::debug!(from = ?self.view, to = %view, "navigate");
            self.buyers = None;
            self.prices = None;
        }
        self.view = Some(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_five_newest_first() {
        let mut h = SearchHistory::default();
        for i in 1..=7 {
            h.push(format!("oro en Trujillo #{}", i));
        }
        let got: Vec<&str> = h.iter().collect();
        assert_eq!(got.len(), 5);
        assert_eq!(got[0], "oro en Trujillo #7");
        assert_eq!(got[4], "oro en Trujillo #3");
    }

    #[test]
    fn navigation_clears_caches_but_not_history() {
        let mut s = Session::default();
        s.navigate(View::Buyers);
        s.buyers = Some(vec![Buyer::default()]);
        s.search_history.push("plata en Lima, Lima");
        s.navigate(View::Buyers);
        assert!(s.buyers.is_some());
        s.navigate(View::Prices);
        assert!(s.buyers.is_none());
        assert_eq!(s.search_history.len(), 1);
        assert_eq!(s.view(), Some(View::Prices));
    }

    #[test]
    fn chat_log_numbers_messages() {
        let mut log = ChatLog::default();
        assert_eq!(log.messages().len(), 1);
        let m = log.push(Sender::User, "hola");
        assert_eq!(m.id, 2);
        assert_eq!(log.messages()[0].sender, Sender::Bot);
    }

    #[test]
    fn view_parse_is_case_insensitive() {
        assert_eq!(View::parse("Tasks"), Some(View::Tasks));
        assert_eq!(View::parse("nope"), None);
    }
}
