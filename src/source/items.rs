//! Item models listed by the screens.
//!
//! Each screen owns one homogeneous list of one of these types.  There are no
//! relationships between kinds; the only thing they share is a stable string
//! id (see [`ListItem`]).

use chrono::{DateTime, Utc};

use super::ListItem;

/// A post in the home feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub username: String,
    pub likes: u32,
    pub comments: u32,
    pub is_video: bool,
}

/// A listing in the market.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image_url: String,
    pub shop_name: String,
    pub sales: u32,
}

/// What produced an inbox entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    System,
    Comment,
    Like,
    Chat,
}

impl MessageKind {
    pub fn label(self) -> &'static str {
        match self {
            MessageKind::System => "system",
            MessageKind::Comment => "comment",
            MessageKind::Like => "like",
            MessageKind::Chat => "chat",
        }
    }
}

/// An entry in the messages inbox.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageItem {
    pub id: String,
    pub sender_name: String,
    pub content: String,
    pub time: DateTime<Utc>,
    pub unread_count: u32,
    pub kind: MessageKind,
}

/// A note on the user's profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub likes: u32,
    pub published: DateTime<Utc>,
}

/// A single line of a chat conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_from_current_user: bool,
}

/// Header shown above the profile's notes.  Not paged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub username: String,
    pub bio: String,
    pub followers: u32,
    pub following: u32,
    pub likes: u32,
}

/// What choosing a profile option leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOptionKind {
    MyPosts,
    Favorites,
    Orders,
    Coupons,
    Wallet,
    Settings,
    Help,
    About,
}

/// One row of the profile's options menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOption {
    pub title: String,
    /// Shown right of the title; empty for most options.
    pub subtitle: String,
    pub kind: ProfileOptionKind,
}

/// Contents of the publish form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub content: String,
}

impl Draft {
    /// Both fields must contain something other than whitespace.
    pub fn is_publishable(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }
}

macro_rules! impl_list_item {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ListItem for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_list_item!(FeedItem, ProductItem, MessageItem, NoteItem, ChatMessage);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_both_fields() {
        let mut draft = Draft::default();
        assert!(!draft.is_publishable());

        draft.title = "Weekend trip".into();
        assert!(!draft.is_publishable());

        draft.content = "   ".into();
        assert!(!draft.is_publishable(), "whitespace-only content is blank");

        draft.content = "Two days in Hangzhou".into();
        assert!(draft.is_publishable());
    }

    #[test]
    fn list_item_id_is_the_model_id() {
        let note = NoteItem {
            id: "note_7".into(),
            title: "t".into(),
            likes: 1,
            published: Utc::now(),
        };
        assert_eq!(ListItem::id(&note), "note_7");
    }
}
