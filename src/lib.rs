pub mod core;
pub mod store;
pub mod query;
pub mod stats;
pub mod import;
pub mod auth;
pub mod service;

/*
┌─────────────────────────────────────────────────────────────────────────────┐
│                        CAREDEX STRUCT ARCHITECTURE                          │
└─────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── CORE LAYER ─────────────────────────────────┐
│                                                                             │
│  ┌──────────────────┐  ┌───────────────────────┐  ┌──────────────────────┐  │
│  │ struct Document  │  │ struct PatientRecord  │  │ struct RecordId      │  │
│  │ • id: RecordId   │  │ • patient_id: i64     │  │ • 0: Uuid            │  │
│  │ • fields:        │  │ • gender: Gender      │  └──────────────────────┘  │
│  │   HashMap<String,│  │ • age: f64            │                            │
│  │   FieldValue>    │  │ • bmi: Option<f64>    │  ┌──────────────────────┐  │
│  └──────────────────┘  │ • stroke: u8 {0,1}    │  │ enum FieldValue      │  │
│                        │ • ...                 │  │ • Text(String)       │  │
│  ┌──────────────────┐  └───────────────────────┘  │ • Number(f64)        │  │
│  │ struct Error     │                             └──────────────────────┘  │
│  │ • kind: ErrorKind│  validate() rejects flags outside {0,1}, age          │
│  │ • context: String│  outside 0-130; absent bmi stays absent through       │
│  └──────────────────┘  to_document()/from_document()                        │
└─────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── STORE LAYER ────────────────────────────────┐
│                                                                             │
│  ┌───────────────────────────────────────────────────────────────────────┐  │
│  │                        trait RecordStore                              │  │
│  │  insert / find_one / find(filter, skip, limit) / count / update /     │  │
│  │  delete / delete_all; StoreUnavailable distinct from NotFound         │  │
│  └───────────────────────────────────────────────────────────────────────┘  │
│                                     ▲                                       │
│  ┌───────────────────────────────────────────────────────────────────────┐  │
│  │ struct MemoryStore                                                    │  │
│  │ • inner: RwLock<Collection>   // HashMap + insertion-order Vec        │  │
│  │ • open()/save()               // JSON snapshot persistence            │  │
│  └───────────────────────────────────────────────────────────────────────┘  │
└─────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── QUERY LAYER ────────────────────────────────┐
│                                                                             │
│  ┌─────────────────────┐  ┌──────────────────────┐  ┌───────────────────┐   │
│  │ enum Filter         │  │ fn build_filter(q)   │  │ struct Page       │   │
│  │ • All               │  │  ""  → All           │  │ • items           │   │
│  │ • PatientId(i64)    │  │  int → PatientId     │  │ • total           │   │
│  │ • TextAny(..)       │  │  str → TextAny       │  │ • page            │   │
│  │ • Stroke(u8)        │  └──────────────────────┘  │ • total_pages     │   │
│  │ • Gender(..)        │                            └───────────────────┘   │
│  │ • AgeBand(..)       │  fetch_page: skip = (page-1)*50, clamp page to 1,  │
│  └─────────────────────┘  past-the-end pages are empty, never errors        │
└─────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────── ANALYTICS LAYER ─────────────────────────────┐
│                                                                             │
│  ┌───────────────────────────┐   ┌──────────────────────────────────────┐   │
│  │ struct StatsSnapshot      │   │ struct RiskCollector                 │   │
│  │ • total / stroke_yes/no   │   │ • heap: BinaryHeap (bounded, k=10)   │   │
│  │ • stroke_rate (1 decimal) │   │ • keeps highest avg_glucose_level    │   │
│  │ • gender_counts [3]       │   └──────────────────────────────────────┘   │
│  │ • age_band_counts [5]     │   bands: [0,20] (20,40] (40,60] (60,80]      │
│  │ • avg_age/glucose/bmi     │   (80,inf); avg_bmi over present values      │
│  │ • high_risk: Vec<..>      │   only; unreachable store → empty()          │
│  └───────────────────────────┘                                              │
└─────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────── SERVICE LAYER ───────────────────────────────┐
│                                                                             │
│  ┌───────────────────────────────────────────────────────────────────────┐  │
│  │ struct Registry                                                       │  │
│  │ • store: Arc<dyn RecordStore>   // injected, no globals               │  │
│  │ • config: Config                                                      │  │
│  │ search / get / create / update / delete / stats / import_csv /        │  │
│  │ authorize_role_change; every operation guarded first                  │  │
│  └───────────────────────────────────────────────────────────────────────┘  │
│                                                                             │
│  ┌─────────────────────────┐   ┌────────────────────────────────────────┐   │
│  │ fn authorize(p, op)     │   │ struct ImportReport                    │   │
│  │ → Allow | RequireLogin  │   │ • imported: u64                        │   │
│  │   | Deny | NoOp         │   │ • failures: Vec<RowFailure>            │   │
│  │ stateless predicate     │   │ replace-all, row failures skipped      │   │
│  └─────────────────────────┘   └────────────────────────────────────────┘   │
└─────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── RELATIONSHIPS ──────────────────────────────┐
│                                                                             │
│  Registry ──guards_with──> authorize ──reads──> Principal                   │
│     │                                                                       │
│     ├──reads_via──> build_filter ──creates──> Filter ──matches──> Document  │
│     │                     │                                                 │
│     │                     └──paged_by──> fetch_page ──calls──> RecordStore  │
│     │                                                                       │
│     ├──aggregates_via──> stats::compute ──collects──> RiskCollector         │
│     │                                                                       │
│     └──imports_via──> import_replace_all ──clears_then_fills──> RecordStore │
│                                                                             │
└─────────────────────────────────────────────────────────────────────────────┘
*/
