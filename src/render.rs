//! Card rendering: structured records plus navigation context in, caption
//! text and inline keyboards out. Pure, no I/O.

use crate::parse::text::html_to_markdown;
use crate::parse::{HotelDetail, HotelSummary, Section};
use crate::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const CONTACT_BUTTON: &str = "📞 Связаться с менеджером";
pub const NEW_SEARCH_BUTTON: &str = "🔍 Новый поиск";

/// A renderable photo card with caption and keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelCard {
    pub photo: String,
    pub caption: String,
    pub keyboard: InlineKeyboardMarkup,
}

/// Builds the paginated card for one hotel in the current result list.
///
/// `total_pages` is usually unknown; the "next page" control is offered
/// unconditionally and the caller handles an empty out-of-range page.
pub fn hotel_card(
    hotel: &HotelSummary,
    index: usize,
    total: usize,
    current_page: u32,
    total_pages: Option<u32>,
) -> HotelCard {
    let glyphs = "⭐".repeat(hotel.stars as usize);
    let caption = format!(
        "🏨 *{name}*\n\n{glyphs} {stars} звезд\n💰 *{price} USD* за ночь\n📍 {place}\n\n📋 Отель {pos} из {total}",
        name = hotel.name,
        stars = hotel.stars,
        price = hotel.price,
        place = hotel.place,
        pos = index + 1,
    );

    let mut rows = Vec::new();

    let mut nav_row = Vec::new();
    if index > 0 {
        nav_row.push(InlineKeyboardButton::new(
            "⬅️ Предыдущий",
            format!("hotel_{}", index - 1),
        ));
    }
    if index + 1 < total {
        nav_row.push(InlineKeyboardButton::new(
            "Следующий ➡️",
            format!("hotel_{}", index + 1),
        ));
    }
    if !nav_row.is_empty() {
        rows.push(nav_row);
    }

    let mut page_row = Vec::new();
    if current_page > 1 {
        page_row.push(InlineKeyboardButton::new(
            "⬅️ Пред. страница",
            format!("page_{}", current_page - 1),
        ));
    }
    let page_label = match total_pages {
        Some(total_pages) => format!("📄 Стр. {current_page}/{total_pages}"),
        None => format!("📄 Стр. {current_page}"),
    };
    // The indicator's payload is not a recognized action; pressing it is a
    // no-op at the dispatcher.
    page_row.push(InlineKeyboardButton::new(page_label, "current_page"));
    page_row.push(InlineKeyboardButton::new(
        "След. страница ➡️",
        format!("page_{}", current_page + 1),
    ));
    rows.push(page_row);

    rows.push(vec![
        InlineKeyboardButton::new(CONTACT_BUTTON, format!("contact_{}", hotel.id)),
        InlineKeyboardButton::new("📋 Подробнее об отеле", format!("detail_{}", hotel.id)),
    ]);
    rows.push(vec![InlineKeyboardButton::new(
        NEW_SEARCH_BUTTON,
        "new_search",
    )]);

    HotelCard {
        photo: hotel.photo.clone(),
        caption,
        keyboard: InlineKeyboardMarkup::new(rows),
    }
}

/// A rendered detail view: optional photo, body text, keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailMessage {
    pub photo: Option<String>,
    pub text: String,
    pub keyboard: InlineKeyboardMarkup,
}

fn section_heading(section: Section) -> &'static str {
    match section {
        Section::Location => "📋 *Описание:*",
        Section::Amenities => "🏪 *Удобства:*",
        Section::Rooms => "🛏 *Номера:*",
        Section::BusinessAmenities => "💼 *Бизнес-удобства:*",
        Section::Attractions => "🗺 *Достопримечательности:*",
    }
}

/// Builds the single unpaginated detail message.
///
/// `raw_text` is the original agent reply, used as a fallback when nothing
/// was extracted. `has_active_list` selects the trailing navigation controls.
pub fn detail_message(
    detail: &HotelDetail,
    raw_text: &str,
    hotel_id: &str,
    has_active_list: bool,
) -> DetailMessage {
    // With nothing extracted there is nothing to structure; show the agent's
    // reply as-is, converted for the chat platform.
    let text = if detail.sections.is_empty() {
        html_to_markdown(raw_text)
    } else {
        let mut text = String::new();
        if !detail.name.is_empty() {
            text.push_str(&format!("🏨 *{}*\n\n", detail.name));
        }
        if !detail.place.is_empty() {
            text.push_str(&format!("📍 *Местоположение:* {}\n", detail.place));
        }
        if detail.stars > 0 {
            text.push_str(&format!(
                "{} {} звезд\n",
                "⭐".repeat(detail.stars as usize),
                detail.stars
            ));
        }
        text.push('\n');

        for (section, body) in &detail.sections {
            text.push_str(&format!(
                "{}\n{}\n\n",
                section_heading(*section),
                html_to_markdown(body)
            ));
        }
        text
    };

    let rows = if has_active_list {
        vec![
            vec![InlineKeyboardButton::new(
                "⬅️ Назад к списку отелей",
                "back_to_list",
            )],
            vec![InlineKeyboardButton::new(
                CONTACT_BUTTON,
                format!("contact_{hotel_id}"),
            )],
        ]
    } else {
        vec![
            vec![InlineKeyboardButton::new(
                CONTACT_BUTTON,
                format!("contact_{hotel_id}"),
            )],
            vec![InlineKeyboardButton::new(NEW_SEARCH_BUTTON, "new_search")],
        ]
    };

    DetailMessage {
        photo: detail.image_url.clone(),
        text,
        keyboard: InlineKeyboardMarkup::new(rows),
    }
}
