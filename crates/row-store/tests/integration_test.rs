use chrono::{DateTime, Duration, TimeZone, Utc};
use row_store::{Row, RowClient, StoreError, TableActor, TableClient, Violation};

// --- Test Row ---

#[derive(Clone, Debug, PartialEq)]
struct Ticket {
    id: u32,
    lane: String,
    done: bool,
    touched_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
enum TicketPatch {
    Finish(DateTime<Utc>),
    Move(String),
}

impl Row for Ticket {
    type Key = u32;
    type Patch = TicketPatch;
    const TABLE: &'static str = "tickets";

    fn key(&self) -> u32 {
        self.id
    }

    fn apply(&mut self, patch: TicketPatch) -> Result<(), Violation> {
        match patch {
            TicketPatch::Finish(at) => {
                if self.done {
                    return Err(Violation::new("done", self.done, "already finished"));
                }
                self.done = true;
                self.touched_at = at;
            }
            TicketPatch::Move(lane) => self.lane = lane,
        }
        Ok(())
    }

    fn stamp(&self) -> Option<DateTime<Utc>> {
        Some(self.touched_at)
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn ticket(id: u32, lane: &str) -> Ticket {
    Ticket {
        id,
        lane: lane.to_string(),
        done: false,
        touched_at: t0(),
    }
}

// --- Wrapper ---

#[derive(Debug, PartialEq)]
struct BoardError(String);

struct Board {
    tickets: TableClient<Ticket>,
}

impl RowClient<Ticket> for Board {
    type Error = BoardError;

    fn table(&self) -> &TableClient<Ticket> {
        &self.tickets
    }

    fn map_error(e: StoreError) -> BoardError {
        BoardError(e.to_string())
    }
}

// --- Tests ---

#[tokio::test]
async fn test_table_full_lifecycle() {
    let (actor, client) = TableActor::<Ticket>::new(10);
    tokio::spawn(actor.run());

    // 1. Insert
    let inserted = client
        .insert(vec![ticket(1, "grill"), ticket(2, "bar"), ticket(3, "grill")])
        .await
        .unwrap();
    assert_eq!(inserted, 3);
    assert_eq!(client.max_key().await.unwrap(), Some(3));

    // 2. Update, newest stamp follows the patch
    let later = t0() + Duration::seconds(30);
    client
        .update(vec![(2, TicketPatch::Finish(later))])
        .await
        .unwrap();
    let summary = client.summarize(|_: &Ticket| true).await.unwrap();
    assert_eq!(summary.count, 3);
    assert_eq!(summary.latest, Some(later));

    // 3. Rejected patch names the column and leaves the batch uncommitted
    let err = client
        .update(vec![
            (1, TicketPatch::Move("bar".to_string())),
            (2, TicketPatch::Finish(later)),
        ])
        .await
        .unwrap_err();
    match err {
        StoreError::Rejected {
            table, key, column, ..
        } => {
            assert_eq!(table, "tickets");
            assert_eq!(key, "2");
            assert_eq!(column, "done");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(client.get(1).await.unwrap().unwrap().lane, "grill");

    // 4. Filtered reads come back in key order
    let grill = client.select(|t: &Ticket| t.lane == "grill").await.unwrap();
    assert_eq!(grill.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);

    // 5. Delete
    assert_eq!(client.delete_where(|t: &Ticket| t.done).await.unwrap(), 1);
    assert!(client.get(2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_row_client_provides_fetch() {
    let (actor, tickets) = TableActor::<Ticket>::new(10);
    tokio::spawn(actor.run());
    let board = Board { tickets };

    board
        .table()
        .insert(vec![ticket(7, "pass")])
        .await
        .unwrap();

    assert_eq!(board.fetch(7).await.unwrap(), Some(ticket(7, "pass")));
    assert_eq!(board.fetch(8).await.unwrap(), None);
    assert_eq!(board.fetch_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_closed_table_reports_closed() {
    let (actor, client) = TableActor::<Ticket>::new(1);
    drop(actor);

    assert_eq!(client.get(1).await, Err(StoreError::Closed));
    let board = Board { tickets: client };
    assert_eq!(
        board.fetch_all().await,
        Err(BoardError("Table closed".to_string()))
    );
}
