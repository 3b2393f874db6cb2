use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::balance::{compute_balances, Mode};
use crate::error::Result;
use crate::fmt::money;
use crate::loader::parse_date;
use crate::settings::get_data_dir;
use crate::store::{get_connection, load_snapshot};

pub fn run(as_of: &str, mode: Mode) -> Result<()> {
    let cutoff = parse_date(as_of)?;

    let conn = get_connection(&get_data_dir().join("barre.db"))?;
    let snap = load_snapshot(&conn)?;
    let summaries = compute_balances(mode, cutoff, &snap)?;

    if summaries.is_empty() {
        println!("No families to report.");
        return Ok(());
    }

    let monthly = mode == Mode::MonthlyFee;
    let mut table = Table::new();
    let mut header = vec!["Family", "Classes", "Fees", "Payments", "Balance"];
    if monthly {
        header.push("Paid in Full");
        header.push("Credits");
    }
    table.set_header(header);

    let (mut charges, mut fees, mut payments, mut balance) = (0i64, 0i64, 0i64, 0i64);
    for s in &summaries {
        let bal = if s.balance > 0 {
            money(s.balance).red().to_string()
        } else {
            money(s.balance).green().to_string()
        };
        let mut row = vec![
            Cell::new(&s.name),
            Cell::new(money(s.charges)),
            Cell::new(money(s.fees)),
            Cell::new(money(s.payments)),
            Cell::new(bal),
        ];
        if monthly {
            let paid = if s.paid_in_full.unwrap_or(false) {
                "yes".green().to_string()
            } else {
                "no".red().to_string()
            };
            row.push(Cell::new(paid));
            row.push(Cell::new(money(s.credits.unwrap_or(0))));
        }
        table.add_row(row);
        charges += s.charges;
        fees += s.fees;
        payments += s.payments;
        balance += s.balance;
    }

    let mut total = vec![
        Cell::new("Total".bold()),
        Cell::new(money(charges)),
        Cell::new(money(fees)),
        Cell::new(money(payments)),
        Cell::new(money(balance)),
    ];
    if monthly {
        total.push(Cell::new(""));
        total.push(Cell::new(""));
    }
    table.add_row(total);

    println!("Family Balances as of {cutoff}\n{table}");
    Ok(())
}
