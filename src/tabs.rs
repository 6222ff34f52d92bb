//! Bottom tab bar: four tabs around a center publish button.
//!
//! Slot layout is `[Home, Market, +, Messages, Profile]`.  The publish slot is
//! not a tab: tapping it asks for the publish form and leaves the selected tab
//! alone.  Cycling with next/previous skips it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Market,
    Messages,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Home, Tab::Market, Tab::Messages, Tab::Profile];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Market => "Market",
            Tab::Messages => "Messages",
            Tab::Profile => "Me",
        }
    }

    /// Position among the four tabs, ignoring the publish slot.
    pub fn index(self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Market => 1,
            Tab::Messages => 2,
            Tab::Profile => 3,
        }
    }

    /// Position in the five-slot bar.
    pub fn slot(self) -> usize {
        let index = self.index();
        if index >= PUBLISH_SLOT {
            index + 1
        } else {
            index
        }
    }
}

/// Slot of the publish button.
pub const PUBLISH_SLOT: usize = 2;

/// Number of slots, publish button included.
pub const SLOT_COUNT: usize = Tab::ALL.len() + 1;

/// What tapping a slot means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    Selected(Tab),
    PublishRequested,
}

/// Map a slot to its tab or to the publish button.
pub fn slot_event(slot: usize) -> Option<TabEvent> {
    match slot {
        PUBLISH_SLOT => Some(TabEvent::PublishRequested),
        s if s < PUBLISH_SLOT => Some(TabEvent::Selected(Tab::ALL[s])),
        s if s < SLOT_COUNT => Some(TabEvent::Selected(Tab::ALL[s - 1])),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabBar {
    selected: Tab,
}

impl Default for TabBar {
    fn default() -> Self {
        Self {
            selected: Tab::Home,
        }
    }
}

impl TabBar {
    pub fn selected(&self) -> Tab {
        self.selected
    }

    /// Slot titles in display order.
    pub fn titles() -> [&'static str; SLOT_COUNT] {
        let mut titles = ["+"; SLOT_COUNT];
        for tab in Tab::ALL {
            titles[tab.slot()] = tab.title();
        }
        titles
    }

    /// Handle a tap on `slot`.  Only tab slots change the selection.
    pub fn tap(&mut self, slot: usize) -> Option<TabEvent> {
        let event = slot_event(slot)?;
        if let TabEvent::Selected(tab) = event {
            self.selected = tab;
        }
        Some(event)
    }

    pub fn next(&mut self) -> Tab {
        self.selected = Tab::ALL[(self.selected.index() + 1) % Tab::ALL.len()];
        self.selected
    }

    pub fn previous(&mut self) -> Tab {
        let len = Tab::ALL.len();
        self.selected = Tab::ALL[(self.selected.index() + len - 1) % len];
        self.selected
    }
}
