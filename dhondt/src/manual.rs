/*!

This is the long-form manual for `dhondt` and the `dhondt` command line program.

## Allocation rules

Seats are handed out one at a time. Every round, each eligible list gets the
quotient `votes / (seats already won + 1)` and the largest quotient wins the
seat. Quotients are compared exactly as fractions: `100 / 2` and `50 / 1` are
equal.

**Threshold.** A list is eligible when it received at least
`total votes * threshold / 100` votes. The default threshold is 3%. Lists
below the threshold are reported with zero seats.

**Special cases.**
- If no vote was cast at all, every list gets zero seats. The threshold is
  not evaluated.
- If no list reaches the threshold, every list gets zero seats. This is a
  valid outcome (`noEligibleCandidates`), not an error.
- An empty set of lists gives an empty result.
- There can be more seats than lists: a list may win several seats.

**Ties.** When several lists share the largest quotient in a round:
1. the list with strictly more votes wins the seat;
2. if the votes are also equal, the list that comes first in the candidate
   order wins.

The second rule is a deterministic policy, not a legal requirement. The
candidate order is the order of the input. With the command line program, it
is the order of the `lists` entry of the configuration when present, and the
order in which the lists first appear in the submissions otherwise.

**Invalid input.** The allocation is rejected before any seat is handed out
when a list has negative votes, a name is empty or repeated, the number of
seats is zero or negative, or the threshold is negative or not a number.

## Input formats

The following formats are supported for the submissions, selected with
`--input-type` or the `provider` field:
* `csv` Comma Separated Values
* `xlsx` Excel spreadsheet
* `json` JSON list of submissions

Every submission is one row: the name of a list and a number of votes. The
same list may appear in many rows; the votes are summed.

### csv

```text
list,votes
Lista A,1200
Lista B,300
Lista A,450
```

The first row is skipped by default. See `firstVoteRowIndex`,
`nameColumnIndex` and `votesColumnIndex` below.

### xlsx

Same layout as `csv`, in the first worksheet or in the worksheet named with
`excelWorksheetName` (or `--excel-worksheet-name`).

### json

```text
[{"name": "Lista A", "votes": 1200}, {"name": "Lista B", "votes": 300}]
```

The array may also be wrapped as `{"lists": [...]}`.

## Configuration

```text
{
  "outputSettings": {
    "contestName": "Legislatura 2025",
    "contestDate": "2025-10-26",
    "contestJurisdiction": "Buenos Aires",
    "contestOffice": "Legisladores",
    "outputDirectory": "output"
  },
  "submissionSources": [
    { "provider": "csv", "filePath": "votes.csv", "nameColumnIndex": 1,
      "votesColumnIndex": 2, "firstVoteRowIndex": 2 }
  ],
  "lists": [{ "name": "Lista A" }, { "name": "Lista B" }],
  "rules": { "totalSeats": 30, "thresholdPercent": 3.0 }
}
```

Column and row indexes start at 1. They may be given as numbers, as strings,
or as a single Excel column letter (`"B"`). File paths are relative to the
configuration file.

`lists` is optional. When present, submissions for any other list are
rejected and every registered list is reported.

## Output

The summary is a JSON document with the configuration of the contest, the
results sorted by seats then votes, and one entry per round with the list
elected and the winning quotient.
*/
