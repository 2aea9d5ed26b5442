//! Built-in Amsterdam lot table.
//!
//! Lets a client start with a populated list before the companion says
//! anything. The table goes through the ordinary allocate/init path, so a
//! seeded directory obeys the same invariants as a synced one: the companion
//! can no longer resize it, and its metadata is fixed.

use parkwatch_proto::{Count, LotMessage, LotName};

/// Capacity assumed for every built-in lot.
pub const DEFAULT_CAPACITY: &str = "1500";

/// Built-in lot names, indexed by lot id.
pub const AMSTERDAM_LOTS: [&str; 36] = [
	"CE-P12 Markenhoven",
	"ZO-P23 Bijlmerdreef",
	"ZO-P05 Villa ArenA",
	"CE-P09 Bijenkorf",
	"CE-P04 Amsterdam Centraal",
	"ZO-P22 Bijlmerdreef",
	"CE-P11 Waterlooplein",
	"ZO-P21 Bijlmerdreef",
	"ZO-P24 Bijlmerdreef",
	"ZO-P04 Villa ArenA",
	"ZD-P3 VU campus",
	"ZD-P2 VUmc (ACTA)",
	"ZD-P1 VUmc (westflank)",
	"CE P+R Zeeburg 2",
	"CE-P08 De Kolk",
	"CE P+R Zeeburg 1",
	"CE-P03 Piet Hein",
	"ZO-P01 ArenA / P+R",
	"ZO-P01 ArenA",
	"ZO-P18 HES/ROC",
	"CE P+R Bos en Lommer",
	"CE-P07 Museumplein",
	"CE-P Olympisch Stadion",
	"CE-P02 P+R Olympisch stadion",
	"CE-P14 Westerpark",
	"ZO-P02 Arena terrein",
	"ZO-P10 Plaza ArenA",
	"CE-P06 Byzantium",
	"CE-P Willemspoort",
	"CE-P01 Sloterdijk",
	"CE-P13 Artis",
	"CE-P Oosterdok",
	"ZO-P06 Pathe/HMH",
	"CE-P10 Stadhuis Muziektheater",
	"CE-P05 Euro Parking",
	"ZO-P03 Mikado",
];

/// Messages that size the directory and populate every built-in lot.
#[must_use]
pub fn seed_messages() -> Vec<LotMessage> {
	let total_count = AMSTERDAM_LOTS.len() as u8;
	std::iter::once(LotMessage::Allocate { total_count })
		.chain((0..total_count).zip(AMSTERDAM_LOTS).map(|(id, name)| LotMessage::Init {
			id,
			name: LotName::truncating(name),
			capacity: Count::from_text(DEFAULT_CAPACITY),
		}))
		.collect()
}
