//! Mock data sources.
//!
//! [`MockSource`] stands in for a paginated API client: it sleeps for a
//! configurable latency, optionally fails, and then synthesizes a page of
//! items.  Ids are derived from the page and limit, so they are unique across
//! pages and stable across runs.  Numeric fields (likes, price, sales...) are
//! sampled from fixed ranges and are only reproducible when a seed is given.
//!
//! The item-kind specific part is an [`ItemGenerator`]; one generator exists
//! per item model.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    ChatMessage, DataSource, Draft, FeedItem, ListItem, MessageItem, MessageKind, NoteItem, Page,
    ProductItem, ProfileOption, ProfileOptionKind, Publisher, UserProfile,
};
use crate::error::FetchError;

/// Knobs shared by every mock source.
#[derive(Debug, Clone, PartialEq)]
pub struct MockOptions {
    /// Artificial delay before each response.
    pub latency: Duration,
    /// Number of pages the source pretends to have.
    pub max_pages: u32,
    /// Probability in `[0, 1]` that a request fails.
    pub failure_rate: f64,
    /// Seed for the sampled fields; `None` samples from entropy.
    pub seed: Option<u64>,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(600),
            max_pages: 5,
            failure_rate: 0.0,
            seed: None,
        }
    }
}

impl MockOptions {
    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Sleep for the latency, then roll for a simulated failure.
    fn simulate_transport(&self, rng: &mut StdRng) -> Result<(), FetchError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        let rate = self.failure_rate.clamp(0.0, 1.0);
        if rate > 0.0 && rng.gen_bool(rate) {
            return Err(FetchError::failed("simulated network failure"));
        }
        Ok(())
    }
}

/// Builds the items of one kind.
pub trait ItemGenerator: Send + Sync + 'static {
    type Item: ListItem;

    /// Prefix of every generated id, e.g. `feed`.
    fn kind(&self) -> &'static str;

    /// Build the item at absolute position `index`, identified by `id`.
    fn generate(&self, id: String, index: u64, rng: &mut StdRng) -> Self::Item;

    /// Whether a page lists its items oldest first.
    ///
    /// Index 0 is the newest item either way; this only flips the order
    /// within each page.
    fn oldest_first(&self) -> bool {
        false
    }
}

/// `count` steps of `step` before now, saturating at the earliest time chrono
/// can represent.
fn ago(step: ChronoDuration, count: u64) -> DateTime<Utc> {
    i32::try_from(count)
        .ok()
        .and_then(|n| step.checked_mul(n))
        .and_then(|back| Utc::now().checked_sub_signed(back))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A paginated source that fabricates items.
pub struct MockSource<G> {
    label: String,
    generator: G,
    options: MockOptions,
    rng: Mutex<StdRng>,
}

impl<G: ItemGenerator> MockSource<G> {
    pub fn new(label: impl Into<String>, generator: G, options: MockOptions) -> Self {
        let rng = Mutex::new(options.rng());
        Self {
            label: label.into(),
            generator,
            options,
            rng,
        }
    }
}

impl<G: ItemGenerator> DataSource for MockSource<G> {
    type Item = G::Item;

    fn name(&self) -> &str {
        &self.label
    }

    fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<G::Item>, FetchError> {
        if page == 0 || limit == 0 {
            return Err(FetchError::InvalidRequest { page, limit });
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| FetchError::failed("mock generator lock poisoned"))?;
        self.options.simulate_transport(&mut rng)?;

        if page > self.options.max_pages {
            return Ok(Page {
                items: Vec::new(),
                has_more: false,
            });
        }

        let kind = self.generator.kind();
        let first = u64::from(page - 1) * u64::from(limit);
        let mut items: Vec<_> = (first..first + u64::from(limit))
            .map(|index| self.generator.generate(format!("{kind}_{index}"), index, &mut rng))
            .collect();
        if self.generator.oldest_first() {
            items.reverse();
        }

        Ok(Page {
            items,
            has_more: page < self.options.max_pages,
        })
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

pub struct FeedGenerator;

impl ItemGenerator for FeedGenerator {
    type Item = FeedItem;

    fn kind(&self) -> &'static str {
        "feed"
    }

    fn generate(&self, id: String, index: u64, rng: &mut StdRng) -> FeedItem {
        FeedItem {
            id,
            title: format!("Post title {index}"),
            content: format!("A short description of post {index} and why it is worth a look"),
            image_url: format!("https://example.com/image{index}.jpg"),
            username: format!("user{}", index % 10),
            likes: rng.gen_range(10..=500),
            comments: rng.gen_range(1..=100),
            is_video: rng.gen_bool(0.5),
        }
    }
}

pub struct ProductGenerator;

impl ItemGenerator for ProductGenerator {
    type Item = ProductItem;

    fn kind(&self) -> &'static str {
        "product"
    }

    fn generate(&self, id: String, index: u64, rng: &mut StdRng) -> ProductItem {
        ProductItem {
            id,
            name: format!("Product {index}"),
            price: f64::from(rng.gen_range(50u32..=500)),
            image_url: format!("https://example.com/product{index}.jpg"),
            shop_name: format!("Shop {}", index % 5),
            sales: rng.gen_range(10..=1000),
        }
    }
}

pub struct MessageGenerator;

const MESSAGE_KINDS: [MessageKind; 4] = [
    MessageKind::System,
    MessageKind::Comment,
    MessageKind::Like,
    MessageKind::Chat,
];

impl ItemGenerator for MessageGenerator {
    type Item = MessageItem;

    fn kind(&self) -> &'static str {
        "message"
    }

    fn generate(&self, id: String, index: u64, rng: &mut StdRng) -> MessageItem {
        let kind = MESSAGE_KINDS[(index % 4) as usize];
        let content = match kind {
            MessageKind::System => "Your account has new activity".to_string(),
            MessageKind::Comment => format!("Commented on your note #{index}"),
            MessageKind::Like => format!("Liked your note #{index}"),
            MessageKind::Chat => "Want to go shopping this weekend?".to_string(),
        };
        MessageItem {
            id,
            sender_name: format!("friend{}", index % 10),
            content,
            time: ago(ChronoDuration::minutes(17), index),
            unread_count: if rng.gen_bool(0.4) { rng.gen_range(1..=5) } else { 0 },
            kind,
        }
    }
}

pub struct NoteGenerator;

impl ItemGenerator for NoteGenerator {
    type Item = NoteItem;

    fn kind(&self) -> &'static str {
        "note"
    }

    fn generate(&self, id: String, index: u64, rng: &mut StdRng) -> NoteItem {
        NoteItem {
            id,
            title: format!("My note {index}"),
            likes: rng.gen_range(10..=500),
            published: ago(ChronoDuration::days(1), index),
        }
    }
}

/// Conversation history with one peer.  Index 0 is the latest message; each
/// page reads top to bottom in time order.
pub struct ChatGenerator {
    pub peer: String,
}

const CHAT_LINES: [&str; 4] = [
    "Saw the note you shared, it looks great!",
    "Thanks, glad you like it",
    "Where did you buy that?",
    "Found it at the market, pretty special right?",
];

impl ItemGenerator for ChatGenerator {
    type Item = ChatMessage;

    fn kind(&self) -> &'static str {
        "chat"
    }

    fn generate(&self, id: String, index: u64, _rng: &mut StdRng) -> ChatMessage {
        let from_me = index % 2 == 1;
        ChatMessage {
            id,
            sender_id: if from_me {
                "current".to_string()
            } else {
                self.peer.clone()
            },
            content: CHAT_LINES[(index % 4) as usize].to_string(),
            timestamp: ago(ChronoDuration::minutes(5), index.saturating_add(1)),
            is_from_current_user: from_me,
        }
    }

    fn oldest_first(&self) -> bool {
        true
    }
}

/// The signed-in user shown on the profile screen.
pub fn mock_profile() -> UserProfile {
    UserProfile {
        username: "pagefeed user".into(),
        bio: "Loves life, shares the good bits".into(),
        followers: 128,
        following: 56,
        likes: 512,
    }
}

/// The profile's options menu, top to bottom.
pub fn mock_profile_options() -> Vec<ProfileOption> {
    use ProfileOptionKind::*;
    [
        ("My posts", MyPosts),
        ("Favorites", Favorites),
        ("Orders", Orders),
        ("Coupons", Coupons),
        ("Wallet", Wallet),
        ("Settings", Settings),
        ("Help", Help),
        ("About", About),
    ]
    .into_iter()
    .map(|(title, kind)| ProfileOption {
        title: title.into(),
        subtitle: if kind == About { "v9.9.0".into() } else { String::new() },
        kind,
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

/// Accepts every draft after a delay, unless the failure roll says otherwise.
pub struct MockPublisher {
    options: MockOptions,
    rng: Mutex<StdRng>,
    next_id: AtomicU64,
}

impl MockPublisher {
    pub fn new(options: MockOptions) -> Self {
        let rng = Mutex::new(options.rng());
        Self {
            options,
            rng,
            next_id: AtomicU64::new(0),
        }
    }
}

impl Publisher for MockPublisher {
    fn publish(&self, draft: &Draft) -> Result<NoteItem, FetchError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| FetchError::failed("mock publisher lock poisoned"))?;
        self.options.simulate_transport(&mut rng)?;

        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(NoteItem {
            id: format!("note_local_{n}"),
            title: draft.title.trim().to_string(),
            likes: 0,
            published: Utc::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
