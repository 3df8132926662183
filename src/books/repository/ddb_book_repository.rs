use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::{AttributeValue, Delete, Put, TransactWriteItem};
use chrono::Utc;

use crate::books::criteria::{CriteriaQuery, Predicate};
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::utils::ddb::{cancellation_codes, parse_date_attribute, parse_day_attribute, parse_item, parse_number_attribute, parse_string_attribute};

// DynamoDB allows at most 100 operands for IN
const MAX_IN_OPERANDS: usize = 100;

// Books live in `table_name` keyed by book_id. Each book also owns a guard item in
// `titles_table` keyed by its title, and both are always written in one transaction so a
// title can be claimed only once.
#[derive(Debug)]
pub struct DDBBookRepository {
    client: Client,
    table_name: String,
    titles_table: String,
}

impl DDBBookRepository {
    pub(crate) fn new(client: Client, table_name: &str, titles_table: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            titles_table: titles_table.to_string(),
        }
    }

    fn put_book(&self, entity: &BookEntity, expected_version: Option<i64>) -> LibraryResult<TransactWriteItem> {
        let val = serde_json::to_value(entity)?;
        let mut put = Put::builder()
            .table_name(self.table_name.as_str())
            .set_item(Some(parse_item(val)?));
        put = match expected_version {
            None => put.condition_expression("attribute_not_exists(book_id)"),
            Some(version) => put
                .condition_expression("attribute_exists(book_id) AND version = :old_version")
                .expression_attribute_values(":old_version", AttributeValue::N(version.to_string())),
        };
        Ok(TransactWriteItem::builder().put(put.build()).build())
    }

    fn claim_title(&self, title: &str, book_id: &str) -> TransactWriteItem {
        let put = Put::builder()
            .table_name(self.titles_table.as_str())
            .item("title", AttributeValue::S(title.to_string()))
            .item("book_id", AttributeValue::S(book_id.to_string()))
            .condition_expression("attribute_not_exists(title)")
            .build();
        TransactWriteItem::builder().put(put).build()
    }

    fn release_title(&self, title: &str, book_id: &str) -> TransactWriteItem {
        let delete = Delete::builder()
            .table_name(self.titles_table.as_str())
            .key("title", AttributeValue::S(title.to_string()))
            .condition_expression("book_id = :book_id")
            .expression_attribute_values(":book_id", AttributeValue::S(book_id.to_string()))
            .build();
        TransactWriteItem::builder().delete(delete).build()
    }

    async fn transact(&self, items: Vec<TransactWriteItem>) -> Result<usize, SdkError<TransactWriteItemsError>> {
        self.client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await
            .map(|_| 1)
    }

    async fn scan(&self, query: &CriteriaQuery) -> LibraryResult<Vec<BookEntity>> {
        let (filter, names, values) = scan_filter(query);
        let mut records = vec![];
        let mut exclusive_start_key = None;
        loop {
            let out = self.client
                .scan()
                .table_name(self.table_name.as_str())
                .consistent_read(false)
                .set_filter_expression(filter.clone())
                .set_expression_attribute_names(names.clone())
                .set_expression_attribute_values(values.clone())
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await.map_err(LibraryError::from)?;
            records.extend(out.items().unwrap_or_default().iter().map(map_to_book));
            match out.last_evaluated_key() {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key.clone()),
                _ => break,
            }
        }
        Ok(records)
    }
}

// Pushes the id and substring predicates down to the scan, the rest is applied in memory.
fn scan_filter(query: &CriteriaQuery) -> (Option<String>,
                                          Option<HashMap<String, String>>,
                                          Option<HashMap<String, AttributeValue>>) {
    let mut clauses = vec![];
    let mut names = HashMap::new();
    let mut values = HashMap::new();
    for predicate in &query.predicates {
        match predicate {
            Predicate::IdIn(ids) if !ids.is_empty() && ids.len() <= MAX_IN_OPERANDS => {
                let operands: Vec<String> = ids.iter().enumerate().map(|(i, id)| {
                    let key = format!(":id{}", i);
                    values.insert(key.clone(), AttributeValue::S(id.to_string()));
                    key
                }).collect();
                names.insert("#book_id".to_string(), "book_id".to_string());
                clauses.push(format!("#book_id IN ({})", operands.join(", ")));
            }
            Predicate::Contains { field, value } => {
                names.insert(format!("#{}", field.name()), field.name().to_string());
                values.insert(format!(":{}", field.name()), AttributeValue::S(value.to_string()));
                clauses.push(format!("contains(#{}, :{})", field.name(), field.name()));
            }
            _ => {}
        }
    }
    if clauses.is_empty() {
        return (None, None, None);
    }
    (Some(clauses.join(" AND ")), Some(names), Some(values))
}

#[async_trait]
impl Repository<BookEntity> for DDBBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let items = vec![
            self.put_book(entity, None)?,
            self.claim_title(entity.title.as_str(), entity.book_id.as_str()),
        ];
        self.transact(items).await.map_err(|err| {
            match cancellation_codes(&err) {
                Some(codes) if is_conditional_failure(&codes, 1) =>
                    LibraryError::duplicate_key(format!("Book {} already exists.", entity.title).as_str()),
                Some(codes) if is_conditional_failure(&codes, 0) =>
                    LibraryError::duplicate_key(format!("book {} already exists", entity.book_id).as_str()),
                _ => LibraryError::from(err),
            }
        })
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let current = self.get(entity.book_id.as_str()).await?;
        let mut updated = entity.clone();
        updated.version = entity.version + 1;
        let mut items = vec![self.put_book(&updated, Some(entity.version))?];
        let title_changed = current.title != entity.title;
        if title_changed {
            items.push(self.release_title(current.title.as_str(), current.book_id.as_str()));
            items.push(self.claim_title(entity.title.as_str(), entity.book_id.as_str()));
        }
        self.transact(items).await.map_err(|err| {
            match cancellation_codes(&err) {
                Some(codes) if title_changed && is_conditional_failure(&codes, 2) =>
                    LibraryError::duplicate_key(format!("Book {} already exists.", entity.title).as_str()),
                Some(codes) if is_conditional_failure(&codes, 0) => LibraryError::database(
                    format!("book {} was modified concurrently", entity.book_id).as_str(), None, false),
                _ => LibraryError::from(err),
            }
        })
    }

    async fn get(&self, id: &str) -> LibraryResult<BookEntity> {
        let out = self.client
            .get_item()
            .table_name(self.table_name.as_str())
            .key("book_id", AttributeValue::S(id.to_string()))
            .consistent_read(true)
            .send()
            .await.map_err(LibraryError::from)?;
        out.item().map(map_to_book)
            .ok_or_else(|| LibraryError::not_found(format!("Book {} not found.", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let current = self.get(id).await?;
        let delete = Delete::builder()
            .table_name(self.table_name.as_str())
            .key("book_id", AttributeValue::S(id.to_string()))
            .condition_expression("attribute_exists(book_id)")
            .build();
        let items = vec![
            TransactWriteItem::builder().delete(delete).build(),
            self.release_title(current.title.as_str(), id),
        ];
        self.transact(items).await.map_err(|err| {
            match cancellation_codes(&err) {
                Some(codes) if is_conditional_failure(&codes, 0) =>
                    LibraryError::not_found(format!("Book {} not found.", id).as_str()),
                _ => LibraryError::from(err),
            }
        })
    }
}

#[async_trait]
impl BookRepository for DDBBookRepository {
    async fn find_by_title(&self, title: &str) -> LibraryResult<BookEntity> {
        let out = self.client
            .get_item()
            .table_name(self.titles_table.as_str())
            .key("title", AttributeValue::S(title.to_string()))
            .consistent_read(true)
            .send()
            .await.map_err(LibraryError::from)?;
        let book_id = out.item()
            .and_then(|item| parse_string_attribute("book_id", item))
            .ok_or_else(|| LibraryError::not_found(format!("Book {} not found.", title).as_str()))?;
        self.get(book_id.as_str()).await
    }

    // Note you cannot use certain reserved words per https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/ReservedWords.html
    async fn query(&self, query: &CriteriaQuery) -> LibraryResult<Vec<BookEntity>> {
        if query.is_empty_result() {
            return Ok(vec![]);
        }
        let records = self.scan(query).await?;
        Ok(query.apply(records))
    }
}

fn is_conditional_failure(codes: &[String], index: usize) -> bool {
    codes.get(index).map(|code| code == "ConditionalCheckFailed").unwrap_or(false)
}

fn map_to_book(map: &HashMap<String, AttributeValue>) -> BookEntity {
    BookEntity {
        book_id: parse_string_attribute("book_id", map).unwrap_or(String::from("")),
        version: parse_number_attribute("version", map),
        title: parse_string_attribute("title", map).unwrap_or(String::from("")),
        author: parse_string_attribute("author", map).unwrap_or(String::from("")),
        isbn: parse_string_attribute("isbn", map),
        publisher: parse_string_attribute("publisher", map),
        published_date: parse_day_attribute("published_date", map),
        language: parse_string_attribute("language", map),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}
