//! Frame documents served to the Farcaster client.
//!
//! Every response is one `fc:frame` vNext HTML page. Result frames only differ
//! by image and button label, so all of them go through [`render_outcome`].

use crate::config::FrameImages;

/// Engagement condition checked before a claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Follow,
    Like,
    Repost,
}

impl Requirement {
    /// Fixed order used when listing missing conditions.
    pub const ALL: [Requirement; 3] = [Requirement::Follow, Requirement::Like, Requirement::Repost];

    pub fn verb(self) -> &'static str {
        match self {
            Requirement::Follow => "follow",
            Requirement::Like => "like",
            Requirement::Repost => "repost",
        }
    }
}

/// Terminal state of one claim request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    ServerError,
    NoUserId,
    AlreadyClaimed,
    /// Missing conditions, in [`Requirement::ALL`] order.
    TryAgain(Vec<Requirement>),
    OutOfStock,
    TransferFailed,
    Claimed,
}

impl ClaimOutcome {
    /// Builds `TryAgain` with the missing conditions sorted into their fixed order.
    pub fn try_again(missing: impl IntoIterator<Item = Requirement>) -> Self {
        let missing: Vec<Requirement> = missing.into_iter().collect();
        ClaimOutcome::TryAgain(
            Requirement::ALL
                .into_iter()
                .filter(|r| missing.contains(r))
                .collect(),
        )
    }

    pub fn label(&self) -> String {
        match self {
            ClaimOutcome::ServerError => "Server error, try later".to_string(),
            ClaimOutcome::NoUserId => "No Farcaster ID found".to_string(),
            ClaimOutcome::AlreadyClaimed => "Already claimed".to_string(),
            ClaimOutcome::TryAgain(missing) => {
                format!("Try again after you {}", join_requirements(missing))
            }
            ClaimOutcome::OutOfStock => "Out of stock".to_string(),
            ClaimOutcome::TransferFailed => "Transfer failed".to_string(),
            ClaimOutcome::Claimed => "Claimed!".to_string(),
        }
    }

    pub fn image<'a>(&self, images: &'a FrameImages) -> &'a str {
        match self {
            ClaimOutcome::ServerError => &images.server_error,
            ClaimOutcome::NoUserId => &images.no_user_id,
            ClaimOutcome::AlreadyClaimed => &images.already_claimed,
            ClaimOutcome::TryAgain(_) => &images.try_again,
            ClaimOutcome::OutOfStock => &images.out_of_stock,
            ClaimOutcome::TransferFailed => &images.transfer_failed,
            ClaimOutcome::Claimed => &images.claimed,
        }
    }
}

/// "follow", "follow & like", "follow, like & repost"
fn join_requirements(missing: &[Requirement]) -> String {
    let verbs: Vec<&str> = missing.iter().map(|r| r.verb()).collect();
    match verbs.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} & {}", rest.join(", "), last),
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Landing frame with the single "claim" button.
pub fn render_entry(images: &FrameImages, claim_url: &str) -> String {
    let image = escape_attr(&images.entry);
    let target = escape_attr(claim_url);
    format!(
        r#"<html>
  <head>
    <meta property="fc:frame" content="vNext" />
    <meta property="fc:frame:image" content="{image}" />
    <meta property="fc:frame:button:1" content="Claim BEPE NFTs" />
    <meta property="fc:frame:button:1:action" content="post" />
    <meta property="fc:frame:button:1:target" content="{target}" />
    <meta property="fc:frame:post_url" content="{target}" />
  </head>
  <body>
    <p>BEPE NFT Claim Frame</p>
  </body>
</html>
"#
    )
}

pub fn render_outcome(outcome: &ClaimOutcome, images: &FrameImages) -> String {
    let image = escape_attr(outcome.image(images));
    let label = escape_attr(&outcome.label());
    format!(
        r#"<html>
  <head>
    <meta property="fc:frame" content="vNext" />
    <meta property="fc:frame:image" content="{image}" />
    <meta property="fc:frame:button:1" content="{label}" />
  </head>
</html>
"#
    )
}
