/// A rendered status embed, kept as a plain record so the channel API seam
/// stays mockable and rendering stays testable without a Discord client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEmbed {
    pub title: String,
    /// Join affordance line: markdown link when joinable, inert code text
    /// otherwise.
    pub description: String,
    /// Set only when the slot is joinable.
    pub url: Option<String>,
    pub color: u32,
    pub fields: Vec<StatusEmbedField>,
    pub footer_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Minimal view of a channel message, enough for the cleanup sweep to decide
/// whether the bot authored it and whether it carries a status payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub id: u64,
    pub author_id: u64,
    pub has_embeds: bool,
}

/// One live bot message, remembered so the next cycle can replace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishedMessage {
    pub slot: usize,
    pub message_id: u64,
}
