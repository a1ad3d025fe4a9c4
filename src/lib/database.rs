use anyhow::{Result, anyhow};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::{Document, doc, oid::ObjectId},
    results::UpdateResult,
};

use crate::constants::{FAVORITES_COLLECTION, REVIEWS_COLLECTION};
use crate::utils::{CONFIG, escape_regex};

#[derive(Clone)]
pub struct DatabaseService {
    reviews: Collection<Document>,
    favorites: Collection<Document>,
}

impl DatabaseService {
    pub async fn new(client: Client) -> Result<Self> {
        // Confirm connectivity before serving; the driver connects lazily.
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        let db = client.database(&CONFIG.database_name);
        Ok(Self {
            reviews: db.collection(REVIEWS_COLLECTION),
            favorites: db.collection(FAVORITES_COLLECTION),
        })
    }

    pub async fn list_reviews(&self) -> Result<Vec<Document>> {
        let cursor = self.reviews.find(doc! {}).sort(doc! { "date": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn search_reviews(&self, term: &str) -> Result<Vec<Document>> {
        let cursor = self.reviews.find(food_name_filter(term)).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn top_rated_reviews(&self, limit: i64) -> Result<Vec<Document>> {
        let cursor = self
            .reviews
            .find(doc! {})
            .sort(doc! { "rating": -1 })
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn reviews_by_author(&self, email: &str) -> Result<Vec<Document>> {
        let cursor = self.reviews.find(doc! { "email": email }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn get_review(&self, id: &str) -> Result<Option<Document>> {
        let oid = parse_object_id(id)?;
        Ok(self.reviews.find_one(doc! { "_id": oid }).await?)
    }

    pub async fn insert_review(&self, review: Document) -> Result<ObjectId> {
        let result = self.reviews.insert_one(review).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| anyhow!("store returned a non-ObjectId insert id"))
    }

    pub async fn update_review(&self, id: &str, fields: Document) -> Result<UpdateResult> {
        let oid = parse_object_id(id)?;
        Ok(self
            .reviews
            .update_one(doc! { "_id": oid }, doc! { "$set": fields })
            .await?)
    }

    pub async fn delete_review(&self, id: &str) -> Result<u64> {
        let oid = parse_object_id(id)?;
        let result = self.reviews.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count)
    }

    pub async fn list_favorites(&self) -> Result<Vec<Document>> {
        let cursor = self
            .favorites
            .find(doc! {})
            .sort(doc! { "date": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn favorites_liked_by(&self, email: &str) -> Result<Vec<Document>> {
        let cursor = self.favorites.find(doc! { "likedByEmail": email }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn insert_favorite(&self, favorite: Document) -> Result<ObjectId> {
        let result = self.favorites.insert_one(favorite).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| anyhow!("store returned a non-ObjectId insert id"))
    }

    pub async fn delete_favorite(&self, id: &str) -> Result<u64> {
        let oid = parse_object_id(id)?;
        let result = self.favorites.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count)
    }

    pub async fn count_reviews(&self) -> Result<u64> {
        Ok(self.reviews.estimated_document_count().await?)
    }

    pub async fn count_favorites(&self) -> Result<u64> {
        Ok(self.favorites.estimated_document_count().await?)
    }
}

// Case-insensitive, unanchored; an empty term matches every record.
fn food_name_filter(term: &str) -> Document {
    doc! { "foodName": { "$regex": escape_regex(term), "$options": "i" } }
}

fn parse_object_id(id: &str) -> Result<ObjectId> {
    Ok(ObjectId::parse_str(id)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_filter_is_case_insensitive_substring() {
        let filter = food_name_filter("Ramen");
        let clause = filter.get_document("foodName").expect("foodName clause");

        assert_eq!(clause.get_str("$regex").expect("$regex"), "Ramen");
        assert_eq!(clause.get_str("$options").expect("$options"), "i");
    }

    #[test]
    fn search_filter_escapes_metacharacters() {
        let filter = food_name_filter("pho (spicy)");
        let clause = filter.get_document("foodName").expect("foodName clause");

        assert_eq!(clause.get_str("$regex").expect("$regex"), "pho \\(spicy\\)");
    }

    #[test]
    fn empty_search_term_builds_a_match_all_pattern() {
        let filter = food_name_filter("");
        let clause = filter.get_document("foodName").expect("foodName clause");

        assert_eq!(clause.get_str("$regex").expect("$regex"), "");
    }

    #[test]
    fn canonical_hex_identifiers_parse() {
        assert!(parse_object_id("0123456789abcdef01234567").is_ok());
    }

    #[test]
    fn malformed_identifiers_are_rejected() {
        assert!(parse_object_id("not-an-id").is_err());
        assert!(parse_object_id("").is_err());
    }
}
