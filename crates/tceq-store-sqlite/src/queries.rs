//! Statement text shared by the single-record and batch write paths.

pub const INSERT_WATER_SYSTEM: &str = "
INSERT INTO water_systems (water_system_no, name, state_code, is_no)
VALUES (:water_system_no, :name, :state_code, :is_no)
ON CONFLICT (water_system_no) DO NOTHING";

pub const RELATIONSHIP_EXISTS: &str = "
SELECT 1 FROM water_buyer_relationships WHERE seller = :seller AND buyer = :buyer";

// The scalar subquery yields NULL for an unknown code, which is stored as-is.
pub const UPSERT_RELATIONSHIP: &str = "
INSERT INTO water_buyer_relationships (seller, buyer, population, availability, created)
VALUES (
    :seller,
    :buyer,
    :population,
    (SELECT id FROM availability_codes WHERE code = :availability),
    :created_timestamp
)
ON CONFLICT (seller, buyer) DO UPDATE SET
    population   = excluded.population,
    availability = excluded.availability,
    created      = COALESCE(water_buyer_relationships.created, excluded.created)
RETURNING availability";

pub const INSERT_AVAILABILITY_CODE: &str = "
INSERT INTO availability_codes (code) VALUES (?1)
ON CONFLICT (code) DO NOTHING";

pub const SELECT_AVAILABILITY_CODES: &str =
  "SELECT id, code FROM availability_codes ORDER BY id";

pub const SELECT_AVAILABILITY_ID: &str =
  "SELECT id FROM availability_codes WHERE code = ?1";

pub const SELECT_WATER_SYSTEM: &str = "
SELECT water_system_no, name, state_code, is_no
FROM water_systems WHERE water_system_no = ?1";

pub const SELECT_WATER_SYSTEMS: &str = "
SELECT water_system_no, name, state_code, is_no
FROM water_systems ORDER BY water_system_no";

pub const SELECT_RELATIONSHIP: &str = "
SELECT seller, buyer, population, availability, created
FROM water_buyer_relationships WHERE seller = ?1 AND buyer = ?2";

pub const SELECT_RELATIONSHIPS_FOR: &str = "
SELECT seller, buyer, population, availability, created
FROM water_buyer_relationships
WHERE seller = ?1 OR buyer = ?1
ORDER BY seller, buyer";
