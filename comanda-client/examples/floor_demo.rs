//! Interactive Floor Sync Example
//!
//! Demonstrates the floor synchronization client:
//! 1. Load the floor plan (tables + upcoming reservations)
//! 2. Keep it fresh via polling and, when granted, server push
//! 3. Drag, rotate and unplace tables, then save the layout in one batch
//!
//! Run: cargo run --example floor_demo

use std::io::{self, Write};
use std::time::Duration;

use comanda_client::floor::{Point, Rect, ZoneFrame};
use comanda_client::{
    ClientConfig, FloorSync, FloorSyncOptions, HttpClient, ReloadPolicy, TapAction,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("\n🍽️  Floor Sync Client");
    println!("=====================\n");

    let base_url = get_input_with_default("Server URL", "http://localhost:8080");
    let token = get_input("Session token (empty for none): ");

    let mut config = ClientConfig::new(&base_url).with_poll_interval(Duration::from_secs(15));
    if !token.is_empty() {
        config = config.with_token(token);
    }

    println!("\n📡 Connecting to {base_url}...");
    let sync = FloorSync::start(HttpClient::new(&config), FloorSyncOptions::from(&config)).await;

    if sync.has_push_channel() {
        println!("✅ Push channel open; updates arrive live.");
    } else {
        println!("⚠️  No push channel; refreshing on the poll interval.");
    }

    // Stand-in canvas rectangles; a real front end measures these.
    sync.editor().set_zone_frames(vec![
        ZoneFrame::new("Interior", Rect::new(0.0, 0.0, 600.0, 500.0)),
        ZoneFrame::new("Terraza", Rect::new(600.0, 0.0, 400.0, 500.0)),
    ]);

    print_floor(&sync);

    loop {
        print_menu();
        io::stdout().flush()?;

        match get_input("Enter choice (0-6): ").as_str() {
            "0" => {
                println!("\n👋 Goodbye!");
                break;
            }
            "1" => {
                sync.refresh().await;
                print_floor(&sync);
            }
            "2" => {
                let id = get_input("Table id: ").parse::<i64>().unwrap_or(0);
                let x = get_input("Drop x: ").parse::<f64>().unwrap_or(0.0);
                let y = get_input("Drop y: ").parse::<f64>().unwrap_or(0.0);
                match sync.editor().drag_end(id, Point::new(x, y)) {
                    Some(placement) => match placement.zona {
                        Some(zona) => println!(
                            "✅ Table {id} placed in {zona} at ({}, {})",
                            placement.pos_x.unwrap_or_default(),
                            placement.pos_y.unwrap_or_default()
                        ),
                        None => println!("↩️  Drop missed every zone; table {id} is unplaced"),
                    },
                    None => println!("❌ No table with id {id}"),
                }
            }
            "3" => {
                let id = get_input("Table id: ").parse::<i64>().unwrap_or(0);
                match sync.editor().rotate_table(id) {
                    Some(rotacion) => println!("✅ Table {id} now at {rotacion}°"),
                    None => println!("❌ No table with id {id}"),
                }
            }
            "4" => {
                let id = get_input("Table id: ").parse::<i64>().unwrap_or(0);
                if sync.editor().remove_from_zone(id) {
                    println!("✅ Table {id} moved to the unplaced tray");
                } else {
                    println!("❌ No table with id {id}");
                }
            }
            "5" => match sync.editor().save_positions().await {
                Ok(()) => println!("💾 Layout saved."),
                Err(e) => println!("❌ Save failed: {e}"),
            },
            "6" => {
                let id = get_input("Table id: ").parse::<i64>().unwrap_or(0);
                let tables = sync.editor().tables();
                match tables.iter().find(|t| t.id == id) {
                    Some(table) => match comanda_client::floor::tap_action(table) {
                        TapAction::NewOrder => println!("🆕 Would start a new order"),
                        TapAction::OpenOrder(order) => {
                            println!("📖 Would open order {}", order.id)
                        }
                    },
                    None => println!("❌ No table with id {id}"),
                }
            }
            _ => println!("❌ Invalid choice"),
        }
    }

    sync.shutdown().await;
    Ok(())
}

fn print_floor(sync: &FloorSync) {
    let editor = sync.editor();
    if let Some(surface) = editor.error_surface() {
        println!("⚠️  Load problem, presenting as {surface:?}");
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for view in editor.views() {
        let place = match (&view.zona, &view.position) {
            (Some(zona), Some(pos)) => format!("{zona} ({}, {}) {}°", pos.x, pos.y, view.rotacion),
            _ => "unplaced".to_string(),
        };
        let reservation = view
            .reservation
            .as_ref()
            .map(|r| format!("  🕐 {} {}", r.fecha_hora.format("%H:%M"), r.cliente_nombre))
            .unwrap_or_default();
        println!(
            "  #{:<3} {:?} cap {:<2} {place}{reservation}",
            view.numero, view.estado, view.capacidad
        );
    }
    if editor.is_dirty() {
        println!("  ✏️  Unsaved layout changes");
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

fn print_menu() {
    println!("\nAvailable Actions:");
    println!("1. Refresh floor");
    println!("2. Drag table to point");
    println!("3. Rotate table");
    println!("4. Remove table from zone");
    println!("5. Save layout");
    println!("6. Tap table");
    println!("0. Exit");
}

fn get_input(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    input.trim().to_string()
}

fn get_input_with_default(prompt: &str, default: &str) -> String {
    print!("{} [{}]: ", prompt, default);
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    let input = input.trim();
    if input.is_empty() {
        default.to_string()
    } else {
        input.to_string()
    }
}
