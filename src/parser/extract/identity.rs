use crate::parser::document::Document;
use crate::parser::paths::Field;
use crate::record::ParcelRecord;

use super::Context;

/// Header block of the primary page: address, owner, folio and friends.
pub fn extract(doc: &Document, ctx: &Context<'_>) -> ParcelRecord {
    let text = |field: Field| doc.text(ctx.paths.get(field));

    ParcelRecord {
        site_address: text(Field::SiteAddress),
        owner: text(Field::Owner),
        mailing_address: text(Field::MailingAddress),
        // the folio is printed in space-separated groups
        id: text(Field::ParcelId).replace(' ', ""),
        mileage: text(Field::Mileage),
        use_code: text(Field::UseCode),
        legal: text(Field::Legal),
        ..Default::default()
    }
}
