//! Tour package catalogue and its card markup.

use crate::dom::{DomTree, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageItem {
    pub name: &'static str,
    pub image: &'static str,
    pub description: &'static str,
}

pub const PACKAGES: [PackageItem; 6] = [
    PackageItem {
        name: "Shimla Delight",
        image: "assets/images/package1.jpg",
        description: "Experience the colonial charm of Shimla with stunning mountain views, pleasant weather, and memorable adventures.",
    },
    PackageItem {
        name: "Manali Magic",
        image: "assets/images/package2.jpg",
        description: "Discover the beauty of Manali with snow-capped peaks, adventure sports, and serene valleys perfect for all travelers.",
    },
    PackageItem {
        name: "Kasol Paradise",
        image: "assets/images/package3.jpg",
        description: "Immerse yourself in the hippie culture of Kasol, surrounded by lush forests, the Parvati River, and peaceful vibes.",
    },
    PackageItem {
        name: "Spiti Expedition",
        image: "assets/images/package4.jpg",
        description: "Embark on a thrilling journey to Spiti Valley, exploring high-altitude deserts, ancient monasteries, and rugged landscapes.",
    },
    PackageItem {
        name: "Dharamshala Retreat",
        image: "assets/images/package5.jpg",
        description: "Find peace in Dharamshala, home to Tibetan culture, scenic tea gardens, and breathtaking Dhauladhar mountain ranges.",
    },
    PackageItem {
        name: "Kullu Adventure",
        image: "assets/images/package6.jpg",
        description: "Explore the vibrant Kullu Valley with river rafting, trekking, and the famous Kullu Dussehra festival experience.",
    },
];

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn card_markup(item: &PackageItem, placeholder: &str) -> String {
    format!(
        r#"<div class="package-card"><img src="{image}" alt="{name}" class="package-image" data-fallback="{fallback}"><div class="package-content"><h3 class="package-name">{name}</h3><p class="package-description">{description}</p><button class="view-details-btn">View Details</button></div></div>"#,
        image = escape_html(item.image),
        name = escape_html(item.name),
        fallback = escape_html(placeholder),
        description = escape_html(item.description),
    )
}

/// A rendered card and its details button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedCard {
    pub item: PackageItem,
    pub card: NodeId,
    pub details_button: Option<NodeId>,
}

/// Append one card per item to `grid`, in order.
pub fn render_cards(
    tree: &mut DomTree,
    grid: NodeId,
    items: &[PackageItem],
    placeholder: &str,
) -> Vec<RenderedCard> {
    let markup: String = items.iter().map(|p| card_markup(p, placeholder)).collect();
    let cards = tree.append_html(grid, &markup);

    cards
        .into_iter()
        .zip(items.iter().copied())
        .map(|(card, item)| {
            let details_button = tree
                .select_within(card, ".view-details-btn")
                .ok()
                .and_then(|found| found.into_iter().next());
            RenderedCard {
                item,
                card,
                details_button,
            }
        })
        .collect()
}

pub fn details_notice(item: &PackageItem) -> String {
    format!(
        "Package details for {} will be shown here. You can implement a modal or redirect to a details page.",
        item.name
    )
}
