// 出力シンクのセットアップ
// スキーマはレーン0だけが作成し、他のレーンはそれを前提にバインドする

use crate::core::{LaneIndex, PipelineError, PipelineResult};
use crate::source::{DataProductRetriever, ProductStorage};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// イベント補助情報を持つプロダクトの名前
pub const EVENT_AUXILIARY: &str = "EventAuxiliary";
/// 補助情報がない場合に追加されるフィールド名
pub const EVENT_ID_FIELD: &str = "EventID";

/// 出力のスキーマ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// プロダクトに対応するフィールド名（スロット順）
    pub fields: Vec<String>,
    pub class_types: Vec<String>,
    /// `EventID` フィールドを追加したかどうか
    pub has_event_id: bool,
}

impl Schema {
    /// プロダクト列からスキーマを作成する
    ///
    /// フィールド名はプロダクト名の最初の '.' より前の部分。
    pub fn from_products(data_products: &[DataProductRetriever]) -> PipelineResult<Self> {
        let mut fields = Vec::with_capacity(data_products.len() + 1);
        let mut class_types = Vec::with_capacity(data_products.len());
        let mut seen = HashSet::new();
        let mut has_auxiliary = false;

        for product in data_products {
            if product.name() == EVENT_AUXILIARY {
                has_auxiliary = true;
            }
            let field = field_name(product.name());
            if field.is_empty() {
                return Err(PipelineError::schema_creation(
                    product.name(),
                    "フィールド名が空になります",
                ));
            }
            if product.class_type().is_empty() {
                return Err(PipelineError::schema_creation(
                    product.name(),
                    "型が指定されていません",
                ));
            }
            if !seen.insert(field.to_string()) {
                return Err(PipelineError::schema_creation(
                    product.name(),
                    format!("フィールド名 {field} が重複しています"),
                ));
            }
            fields.push(field.to_string());
            class_types.push(product.class_type().to_string());
        }

        let has_event_id = !has_auxiliary;
        if has_event_id {
            fields.push(EVENT_ID_FIELD.to_string());
        }

        Ok(Self {
            fields,
            class_types,
            has_event_id,
        })
    }

    /// プロダクトに対応するフィールドの数
    pub fn product_fields(&self) -> usize {
        self.class_types.len()
    }
}

fn field_name(product_name: &str) -> &str {
    product_name.split('.').next().unwrap_or(product_name)
}

/// スキーマとレーンごとのストレージのバインド
pub struct OutputSetup {
    schema: OnceLock<Schema>,
    entries: Vec<OnceLock<Vec<Arc<ProductStorage>>>>,
}

impl OutputSetup {
    pub fn new(num_lanes: usize) -> Self {
        Self {
            schema: OnceLock::new(),
            entries: (0..num_lanes).map(|_| OnceLock::new()).collect(),
        }
    }

    /// レーンのセットアップ
    ///
    /// レーン0ならスキーマを作成して `Some` を返す。他のレーンはスキーマが
    /// 未作成なら `SetupOrder` エラー。
    pub fn setup_for_lane(
        &self,
        lane: LaneIndex,
        data_products: &[DataProductRetriever],
    ) -> PipelineResult<Option<&Schema>> {
        let entry = self.entries.get(lane).ok_or_else(|| {
            PipelineError::configuration(format!(
                "レーン {lane} は出力シンクのレーン数 {} を超えています",
                self.entries.len()
            ))
        })?;

        let created = if lane == 0 {
            let schema = Schema::from_products(data_products)?;
            let mut created = false;
            let schema = self.schema.get_or_init(|| {
                created = true;
                schema
            });
            created.then_some(schema)
        } else {
            let schema = self.schema.get().ok_or(PipelineError::setup_order(lane))?;
            if schema.product_fields() != data_products.len() {
                return Err(PipelineError::schema_creation(
                    format!("lane {lane}"),
                    format!(
                        "プロダクト数 {} がスキーマの {} と一致しません",
                        data_products.len(),
                        schema.product_fields()
                    ),
                ));
            }
            None
        };

        let storages = data_products
            .iter()
            .map(|product| product.address().clone())
            .collect();
        if entry.set(storages).is_err() {
            tracing::debug!(lane, "lane already bound, keeping first binding");
        }

        Ok(created)
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.get()
    }

    /// レーンにバインドされたストレージ
    pub fn entry(&self, lane: LaneIndex) -> Option<&[Arc<ProductStorage>]> {
        self.entries.get(lane)?.get().map(Vec::as_slice)
    }

    pub fn num_lanes(&self) -> usize {
        self.entries.len()
    }
}
